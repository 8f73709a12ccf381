#![warn(
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_qualifications
)]
#![allow(clippy::enum_variant_names, clippy::type_complexity)]

use std::io::Write as _;
use std::path::Path;
use std::process::ExitCode;

mod cli;
mod errors;
mod git;
mod make_meta;
mod mirror;
mod params_file;
mod patch;
mod replay;
mod rev_list;
mod svn;
mod term_out;
mod tool;
mod trace;
mod user_map;
mod workspace;

use term_out::ProgressPrint;

type FHashMap<K, V> = std::collections::HashMap<K, V, foldhash::fast::RandomState>;

enum RunError {
    Generic,
    Usage,
}

fn main() -> ExitCode {
    match main_inner() {
        Ok(()) => ExitCode::SUCCESS,
        Err(RunError::Generic) => ExitCode::from(1),
        Err(RunError::Usage) => ExitCode::from(2),
    }
}

fn main_inner() -> Result<(), RunError> {
    let start = std::time::Instant::now();

    let args = match <cli::Cli as clap::Parser>::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let usage = e.use_stderr();
            let _ = e.print();
            return if usage { Err(RunError::Usage) } else { Ok(()) };
        }
    };

    let progress_print = term_out::init(start, !args.no_progress);

    let stderr_log_level = args
        .stderr_log_level
        .unwrap_or(cli::LogLevel::Warn)
        .to_log_level_filter();
    let file_log_level = args.file_log_level.map(cli::LogLevel::to_log_level_filter);

    if let Err(e) = init_logger(
        Some(stderr_log_level),
        args.log_file.as_deref(),
        file_log_level,
        progress_print.clone(),
    ) {
        eprintln!("failed to initialize logging: {e}");
        return Err(RunError::Generic);
    }

    match args.command {
        cli::Command::Trace(args) => run_trace(&progress_print, &args),
        cli::Command::Import(args) => run_import(&progress_print, &args),
        cli::Command::Am(args) => run_am(&args),
    }
}

fn run_trace(progress_print: &ProgressPrint, args: &cli::TraceArgs) -> Result<(), RunError> {
    let policy = if args.strict_copies {
        trace::CopySourcePolicy::Reject
    } else {
        trace::CopySourcePolicy::LastWins
    };

    let source = svn::SvnCli::new(&args.repo_url);
    let records = trace::trace(&source, &args.path, args.rev, policy).map_err(|e| {
        log_error(&e);
        RunError::Generic
    })?;

    let output = match args.output {
        Some(ref path) => {
            let file = std::fs::File::create(path).map_err(|e| {
                tracing::error!("failed to create {path:?}: {e}");
                RunError::Generic
            })?;
            Some(std::io::BufWriter::new(file))
        }
        None => None,
    };

    let num_records = if let Some(mut output) = output {
        let num_records = emit_records(records, |line| writeln!(output, "{line}"))?;
        output.flush().map_err(|e| {
            tracing::error!("failed to write revision list: {e}");
            RunError::Generic
        })?;
        num_records
    } else {
        emit_records(records, |line| progress_print.print_out_line(line))?
    };

    tracing::info!("traced {num_records} revisions of {}", args.path);
    Ok(())
}

/// Writes each traced record with `emit`. A reader that goes away (e.g.
/// `s2g trace ... | head`) ends the trace early without an error.
fn emit_records(
    records: impl Iterator<Item = Result<rev_list::RevisionRecord, errors::Error>>,
    mut emit: impl FnMut(&str) -> std::io::Result<()>,
) -> Result<usize, RunError> {
    let mut num_records = 0usize;
    for record in records {
        let record = record.map_err(|e| {
            log_error(&e);
            RunError::Generic
        })?;

        match emit(&record.to_string()) {
            Ok(()) => num_records += 1,
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!("output closed after {num_records} revisions");
                break;
            }
            Err(e) => {
                tracing::error!("failed to write revision list: {e}");
                return Err(RunError::Generic);
            }
        }
    }
    Ok(num_records)
}

fn run_import(progress_print: &ProgressPrint, args: &cli::ImportArgs) -> Result<(), RunError> {
    let (params, params_dir) = match args.params {
        Some(ref params_path) => {
            let params_raw = std::fs::read_to_string(params_path).map_err(|e| {
                tracing::error!("failed to read {params_path:?}: {e}");
                RunError::Generic
            })?;
            let params: params_file::ImportParams = toml::from_str(&params_raw).map_err(|e| {
                tracing::error!("failed to parse {params_path:?}: {e}");
                RunError::Generic
            })?;
            (params, params_path.parent().map(Path::to_path_buf))
        }
        None => (params_file::ImportParams::default(), None),
    };

    let Some(repo_url) = args.repo_url.as_deref().or(params.repo_url.as_deref()) else {
        tracing::error!("no repository URL, use \"--repo\" or \"repo-url\"");
        return Err(RunError::Usage);
    };
    let svn_url = params.svn_url.as_deref().unwrap_or(repo_url);

    let svn_uuid = params
        .svn_uuid
        .as_deref()
        .map(uuid::Uuid::parse_str)
        .transpose()
        .map_err(|e| {
            tracing::error!("invalid \"svn-uuid\": {e}");
            RunError::Generic
        })?;

    let user_map_path = if let Some(ref authors) = args.authors {
        authors.clone()
    } else if let Some(ref user_map_path) = params.user_map_file {
        match params_dir {
            Some(ref params_dir) if user_map_path.is_relative() => params_dir.join(user_map_path),
            _ => user_map_path.clone(),
        }
    } else {
        tracing::error!("no author map, use \"--authors\" or \"user-map-file\"");
        return Err(RunError::Usage);
    };
    let user_map = read_user_map(&user_map_path)?;

    let revs_raw = std::fs::read_to_string(&args.revs).map_err(|e| {
        tracing::error!("failed to read {:?}: {e}", args.revs);
        RunError::Generic
    })?;
    let records = rev_list::parse(&revs_raw, &args.revs.to_string_lossy()).map_err(|e| {
        log_error(&e);
        RunError::Generic
    })?;

    let commit_msg_template = params
        .commit_msg_template
        .as_deref()
        .unwrap_or(make_meta::DEFAULT_COMMIT_MSG_TEMPLATE);

    let meta_maker =
        make_meta::GitMetaMaker::new(&user_map, svn_url, svn_uuid, commit_msg_template).map_err(
            |e| {
                log_error(&e);
                RunError::Generic
            },
        )?;

    if !params.keep_workspace && args.dest.is_none() {
        tracing::error!("\"keep-workspace = false\" needs \"--dest\", the repository would be removed");
        return Err(RunError::Usage);
    }

    let workspace_parent = params
        .workspace_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let workspace =
        workspace::Workspace::create(&workspace_parent, params.keep_workspace).map_err(|e| {
            log_error(&e);
            RunError::Generic
        })?;

    let repo_dir = args.dest.clone().unwrap_or_else(|| workspace.git_dir());
    let repo = git::GitRepo::init(&repo_dir).map_err(|e| {
        log_error(&e);
        RunError::Generic
    })?;

    let source = svn::SvnCli::new(repo_url);
    let r = replay::replay(
        progress_print,
        &source,
        &meta_maker,
        &workspace,
        &repo,
        records,
    );

    match r {
        Ok(summary) => {
            tracing::info!("created {} commits in {repo_dir:?}", summary.commits);
            Ok(())
        }
        Err(e) => {
            log_error(&e);
            Err(RunError::Generic)
        }
    }
}

fn log_error(e: &errors::Error) {
    tracing::error!("{e}");
    if e.kind() == errors::ErrorKind::UnmappedAuthor {
        tracing::error!("add the author to the author map and import the remaining revisions");
    }
}

fn read_user_map(path: &Path) -> Result<user_map::UserMap, RunError> {
    let file = std::fs::OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| {
            tracing::error!("failed to open user map {path:?}: {e}");
            RunError::Generic
        })?;

    user_map::UserMap::parse(
        &mut std::io::BufReader::new(file),
        &path.to_string_lossy(),
    )
    .map_err(|e| {
        tracing::error!("failed to read user map {path:?}: {e}");
        RunError::Generic
    })
}

fn run_am(args: &cli::AmArgs) -> Result<(), RunError> {
    git::GitRepo::open(&args.repo)
        .and_then(|repo| patch::apply(&repo, &args.patch, args.skip_unparsable))
        .map(|_| ())
        .map_err(|e| {
            log_error(&e);
            RunError::Generic
        })
}

fn init_logger(
    stderr_level: Option<tracing::Level>,
    file_path: Option<&Path>,
    file_level: Option<tracing::Level>,
    progress_print: ProgressPrint,
) -> Result<(), std::io::Error> {
    use tracing_subscriber::layer::{Layer as _, SubscriberExt as _};
    use tracing_subscriber::util::SubscriberInitExt as _;

    let stderr_sub = if let Some(stderr_level) = stderr_level {
        let filter = tracing_subscriber::filter::LevelFilter::from_level(stderr_level);
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .without_time()
                .with_writer(MakeLogPrinter::new(progress_print))
                .with_filter(filter),
        )
    } else {
        None
    };

    let file_sub = if let Some(file_path) = file_path {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        let filter = tracing_subscriber::filter::LevelFilter::from_level(
            file_level.unwrap_or(tracing::Level::DEBUG),
        );
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file)
                .with_filter(filter),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(stderr_sub)
        .with(file_sub)
        .init();

    Ok(())
}

struct MakeLogPrinter {
    progress_print: ProgressPrint,
}

impl MakeLogPrinter {
    fn new(progress_print: ProgressPrint) -> Self {
        Self { progress_print }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for MakeLogPrinter {
    type Writer = LogPrinter<'a>;

    fn make_writer(&'a self) -> LogPrinter<'a> {
        LogPrinter {
            progress_print: &self.progress_print,
            buf: Vec::new(),
        }
    }
}

struct LogPrinter<'a> {
    progress_print: &'a ProgressPrint,
    buf: Vec<u8>,
}

impl Drop for LogPrinter<'_> {
    fn drop(&mut self) {
        if !self.buf.is_empty() {
            self.progress_print.print_raw_line(&self.buf);
        }
    }
}

impl std::io::Write for LogPrinter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend(buf);
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.buf.extend(buf);
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
