use std::path::PathBuf;

use crate::svn::Rev;

#[derive(clap::Parser)]
pub(crate) struct Cli {
    #[arg(
        long = "stderr-log-level",
        value_name = "LEVEL",
        value_enum,
        global = true,
        help = "Maximum stderr log level (warn by default)"
    )]
    pub(crate) stderr_log_level: Option<LogLevel>,
    #[arg(
        long = "log-file",
        value_name = "PATH",
        global = true,
        help = "File to write logs (besides stderr)"
    )]
    pub(crate) log_file: Option<PathBuf>,
    #[arg(
        long = "file-log-level",
        value_name = "LEVEL",
        value_enum,
        global = true,
        help = "Maximum file log level (debug by default)"
    )]
    pub(crate) file_log_level: Option<LogLevel>,
    #[arg(long = "no-progress", global = true, help = "Do not print progress")]
    pub(crate) no_progress: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(clap::Subcommand)]
pub(crate) enum Command {
    /// Lists the revisions of a path, newest first, following copies
    #[command(name = "trace")]
    Trace(TraceArgs),
    /// Replays listed revisions as commits of a new Git repository
    #[command(name = "import")]
    Import(ImportArgs),
    /// Applies a patch with its author as committer
    #[command(name = "am")]
    Am(AmArgs),
}

#[derive(clap::Args)]
pub(crate) struct TraceArgs {
    #[arg(
        long = "repo",
        short = 'r',
        value_name = "URL",
        help = "URL of the Subversion repository"
    )]
    pub(crate) repo_url: String,
    #[arg(
        long = "strict-copies",
        help = "Fail when a revision copies the path from several sources"
    )]
    pub(crate) strict_copies: bool,
    #[arg(
        long = "output",
        short = 'o',
        value_name = "FILE",
        help = "Write the revision list to FILE instead of stdout"
    )]
    pub(crate) output: Option<PathBuf>,
    #[arg(value_name = "PATH", help = "Path inside the repository (e.g. /trunk/foo)")]
    pub(crate) path: String,
    #[arg(value_name = "REV", default_value = "HEAD", help = "Revision to start from")]
    pub(crate) rev: Rev,
}

#[derive(clap::Args)]
pub(crate) struct ImportArgs {
    #[arg(
        long = "params",
        short = 'P',
        value_name = "FILE",
        help = "Import parameters"
    )]
    pub(crate) params: Option<PathBuf>,
    #[arg(
        long = "repo",
        short = 'r',
        value_name = "URL",
        help = "URL of the Subversion repository (overrides \"repo-url\")"
    )]
    pub(crate) repo_url: Option<String>,
    #[arg(
        long = "authors",
        short = 'A',
        value_name = "FILE",
        help = "Author map (overrides \"user-map-file\")"
    )]
    pub(crate) authors: Option<PathBuf>,
    #[arg(
        long = "dest",
        short = 'd',
        value_name = "PATH",
        help = "Where to create the Git repository (inside the workspace by default)"
    )]
    pub(crate) dest: Option<PathBuf>,
    #[arg(value_name = "REVS", help = "Revision list, as written by \"s2g trace\"")]
    pub(crate) revs: PathBuf,
}

#[derive(clap::Args)]
pub(crate) struct AmArgs {
    #[arg(
        long = "repo",
        value_name = "DIR",
        default_value = ".",
        help = "Git repository to apply the patch to"
    )]
    pub(crate) repo: PathBuf,
    #[arg(
        long = "skip-unparsable",
        help = "Do nothing when the patch has no \"From:\"/\"Date:\" header"
    )]
    pub(crate) skip_unparsable: bool,
    #[arg(value_name = "PATCH")]
    pub(crate) patch: PathBuf,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub(crate) fn to_log_level_filter(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use crate::svn::Rev;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        <Cli as clap::Parser>::try_parse_from(std::iter::once("s2g").chain(args.iter().copied()))
    }

    #[test]
    fn test_trace_args() {
        let cli = parse(&["trace", "--repo", "file:///srv/svn", "/trunk/foo"]).unwrap();
        let Command::Trace(args) = cli.command else {
            panic!("expected trace");
        };
        assert_eq!(args.path, "/trunk/foo");
        assert_eq!(args.rev, Rev::Head);
        assert!(!args.strict_copies);

        let cli = parse(&[
            "trace",
            "--no-progress",
            "--strict-copies",
            "-r",
            "file:///srv/svn",
            "/trunk/foo",
            "r20",
        ])
        .unwrap();
        assert!(cli.no_progress);
        let Command::Trace(args) = cli.command else {
            panic!("expected trace");
        };
        assert_eq!(args.rev, Rev::Number(20));
        assert!(args.strict_copies);
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["trace", "/trunk"]).is_err());
        assert!(parse(&["trace", "-r", "file:///srv/svn", "/trunk", "PREV"]).is_err());
        assert!(parse(&["am"]).is_err());
        assert!(parse(&["import", "--stderr-log-level", "loud", "revs.txt"]).is_err());
    }

    #[test]
    fn test_am_args() {
        let cli = parse(&["--stderr-log-level", "info", "am", "0001-fix.patch"]).unwrap();
        let Command::Am(args) = cli.command else {
            panic!("expected am");
        };
        assert_eq!(args.repo, std::path::Path::new("."));
        assert!(!args.skip_unparsable);
    }
}
