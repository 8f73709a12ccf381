use std::io::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Shared terminal output: a single progress line at the bottom of
/// stderr, with log lines and operator output printed above it.
#[derive(Clone)]
pub(crate) struct ProgressPrint {
    state: Arc<Mutex<State>>,
}

struct State {
    start: Instant,
    enable_progress: bool,
    progress: Option<String>,
}

pub(crate) fn init(start: Instant, enable_progress: bool) -> ProgressPrint {
    ProgressPrint {
        state: Arc::new(Mutex::new(State {
            start,
            enable_progress,
            progress: None,
        })),
    }
}

impl ProgressPrint {
    pub(crate) fn set_progress(&self, progress: String) {
        let mut state = self.state.lock().unwrap();
        if !state.enable_progress {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        let line = render_progress_line(state.start, &progress);
        handle_err(crossterm::queue!(
            stderr,
            crossterm::cursor::MoveToColumn(0),
            crossterm::style::Print(line),
            crossterm::terminal::Clear(crossterm::terminal::ClearType::UntilNewLine),
        ));
        handle_err(stderr.flush());
        state.progress = Some(progress);
    }

    /// Leaves the current progress line on screen and starts a new one.
    pub(crate) fn freeze_progress(&self) {
        let mut state = self.state.lock().unwrap();
        if state.progress.take().is_some() {
            let mut stderr = std::io::stderr().lock();
            handle_err(crossterm::queue!(
                stderr,
                crossterm::style::Print('\n'),
                crossterm::cursor::MoveToColumn(0),
            ));
            handle_err(stderr.flush());
        }
    }

    /// Prints a complete line (including its line terminator) on stderr.
    pub(crate) fn print_raw_line(&self, line: &[u8]) {
        let state = self.state.lock().unwrap();
        let mut stderr = std::io::stderr().lock();
        clear_progress(&state, &mut stderr);
        handle_err(stderr.write_all(line));
        redraw_progress(&state, &mut stderr);
        handle_err(stderr.flush());
    }

    /// Prints a line on stdout without breaking the progress line.
    ///
    /// Unlike the terminal writes, stdout failures are returned, since
    /// stdout may be a pipe closed by its reader.
    pub(crate) fn print_out_line(&self, line: &str) -> std::io::Result<()> {
        let state = self.state.lock().unwrap();
        let mut stderr = std::io::stderr().lock();
        clear_progress(&state, &mut stderr);
        handle_err(stderr.flush());

        let mut stdout = std::io::stdout().lock();
        let r = writeln!(stdout, "{line}").and_then(|()| stdout.flush());

        redraw_progress(&state, &mut stderr);
        handle_err(stderr.flush());
        r
    }
}

fn clear_progress(state: &State, stderr: &mut std::io::StderrLock<'_>) {
    if state.progress.is_some() {
        handle_err(crossterm::queue!(
            stderr,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::CurrentLine),
            crossterm::cursor::MoveToColumn(0),
        ));
    }
}

fn redraw_progress(state: &State, stderr: &mut std::io::StderrLock<'_>) {
    if let Some(ref progress) = state.progress {
        let line = render_progress_line(state.start, progress);
        handle_err(crossterm::queue!(stderr, crossterm::style::Print(line)));
    }
}

fn render_progress_line(start: Instant, line: &str) -> String {
    let elapsed = start.elapsed().as_secs();
    let secs = elapsed % 60;
    let mins = (elapsed / 60) % 60;
    let hours = elapsed / 3600;

    format!("[{hours:02}:{mins:02}:{secs:02}] {line}")
}

fn handle_err<T>(r: std::io::Result<T>) -> T {
    r.expect("terminal write failed")
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::render_progress_line;

    #[test]
    fn test_render_progress_line() {
        let start = Instant::now() - Duration::from_secs(3 * 3600 + 25 * 60 + 7);
        assert_eq!(
            render_progress_line(start, "replaying r15 (2 / 4)"),
            "[03:25:07] replaying r15 (2 / 4)"
        );
    }
}
