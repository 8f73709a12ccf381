use crate::errors::Error;

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod log_xml;

pub(crate) use client::SvnCli;
pub(crate) use log_xml::parse_log;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogEntry {
    pub(crate) rev: u32,
    pub(crate) author: Option<String>,
    /// ISO 8601 timestamp exactly as Subversion reported it.
    pub(crate) date: Option<String>,
    pub(crate) message: String,
    pub(crate) changes: Vec<PathChange>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct PathChange {
    pub(crate) path: String,
    pub(crate) action: ChangeAction,
    pub(crate) kind: Option<NodeKind>,
    pub(crate) copy_from: Option<CopyFrom>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CopyFrom {
    pub(crate) path: String,
    pub(crate) rev: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ChangeAction {
    Add,
    Delete,
    Modify,
    Replace,
}

impl ChangeAction {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Self::Add),
            "D" => Some(Self::Delete),
            "M" => Some(Self::Modify),
            "R" => Some(Self::Replace),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeKind {
    File,
    Dir,
}

impl NodeKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(Self::File),
            "dir" => Some(Self::Dir),
            _ => None,
        }
    }
}

/// Revision selector for a log query.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Rev {
    Head,
    Number(u32),
}

impl std::fmt::Display for Rev {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Head => f.write_str("HEAD"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl std::str::FromStr for Rev {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        if s.eq_ignore_ascii_case("HEAD") {
            Ok(Self::Head)
        } else {
            s.strip_prefix('r')
                .unwrap_or(s)
                .parse()
                .map(Self::Number)
                .map_err(|_| format!("invalid revision {s:?}"))
        }
    }
}

/// Read access to a Subversion repository.
///
/// Paths are relative to the repository root and start with `/`.
pub(crate) trait SvnSource {
    /// Verbose log of `path@peg`, from `peg` down to `end`, newest first.
    fn log(&self, path: &str, peg: Rev, end: u32) -> Result<Vec<LogEntry>, Error>;

    /// Verbose log of the single revision `rev` of `path@rev`.
    fn log_rev(&self, path: &str, rev: u32) -> Result<LogEntry, Error>;

    /// Exports the tree of `path@rev` into `dest`, which must not exist.
    fn export(&self, path: &str, rev: u32, dest: &std::path::Path) -> Result<(), Error>;
}
