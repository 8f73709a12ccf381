use std::ffi::OsString;

#[derive(Debug)]
pub(crate) enum Error {
    UnmappedAuthor {
        author: String,
        rev: u32,
    },
    ExternalTool {
        program: OsString,
        args: Vec<OsString>,
        failure: ToolFailure,
    },
    MalformedInput {
        what: String,
        reason: String,
    },
    Io {
        what: String,
        error: std::io::Error,
    },
}

#[derive(Debug)]
pub(crate) enum ToolFailure {
    Spawn(std::io::Error),
    Exit {
        status: std::process::ExitStatus,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ErrorKind {
    UnmappedAuthor,
    ExternalToolFailure,
    MalformedInput,
    Io,
}

impl Error {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Self::UnmappedAuthor { .. } => ErrorKind::UnmappedAuthor,
            Self::ExternalTool { .. } => ErrorKind::ExternalToolFailure,
            Self::MalformedInput { .. } => ErrorKind::MalformedInput,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn malformed(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(what: impl Into<String>, error: std::io::Error) -> Self {
        Self::Io {
            what: what.into(),
            error,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmappedAuthor { author, rev } => {
                write!(f, "no such author {author:?} (revision {rev})")
            }
            Self::ExternalTool {
                program,
                args,
                failure,
            } => {
                write!(f, "{program:?}")?;
                for arg in args.iter() {
                    write!(f, " {arg:?}")?;
                }
                match failure {
                    ToolFailure::Spawn(e) => write!(f, " could not be spawned: {e}"),
                    ToolFailure::Exit {
                        status,
                        stdout,
                        stderr,
                    } => {
                        write!(f, " finished with {status}")?;
                        if !stdout.is_empty() {
                            write!(f, "\nstdout:\n{}", String::from_utf8_lossy(stdout))?;
                        }
                        if !stderr.is_empty() {
                            write!(f, "\nstderr:\n{}", String::from_utf8_lossy(stderr))?;
                        }
                        Ok(())
                    }
                }
            }
            Self::MalformedInput { what, reason } => write!(f, "malformed {what}: {reason}"),
            Self::Io { what, error } => write!(f, "{what}: {error}"),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::{Error, ErrorKind};

    #[test]
    fn test_kind_and_display() {
        let e = Error::UnmappedAuthor {
            author: "ftyers".into(),
            rev: 3423,
        };
        assert_eq!(e.kind(), ErrorKind::UnmappedAuthor);
        assert_eq!(e.to_string(), "no such author \"ftyers\" (revision 3423)");

        let e = Error::malformed("revision list line 3", "missing path");
        assert_eq!(e.kind(), ErrorKind::MalformedInput);
        assert_eq!(
            e.to_string(),
            "malformed revision list line 3: missing path"
        );
    }
}
