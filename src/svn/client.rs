use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use super::{LogEntry, Rev, SvnSource, parse_log};
use crate::errors::Error;
use crate::tool;

/// [`SvnSource`] backed by the `svn` command line client.
pub(crate) struct SvnCli {
    repo_url: String,
}

impl SvnCli {
    pub(crate) fn new(repo_url: &str) -> Self {
        Self {
            repo_url: repo_url.trim_end_matches('/').into(),
        }
    }

    fn target(&self, path: &str, peg: Rev) -> OsString {
        format!("{}{path}@{peg}", self.repo_url).into()
    }

    fn run_log(&self, path: &str, peg: Rev, range: &str) -> Result<Vec<LogEntry>, Error> {
        let stdout = tool::run(
            Command::new("svn")
                .arg("log")
                .arg("--non-interactive")
                .arg("--verbose")
                .arg("--xml")
                .arg("-r")
                .arg(range)
                .arg(self.target(path, peg)),
        )?;
        let xml = String::from_utf8(stdout)
            .map_err(|e| Error::malformed("svn log XML", e.to_string()))?;
        parse_log(&xml)
    }
}

impl SvnSource for SvnCli {
    fn log(&self, path: &str, peg: Rev, end: u32) -> Result<Vec<LogEntry>, Error> {
        self.run_log(path, peg, &format!("{peg}:{end}"))
    }

    fn log_rev(&self, path: &str, rev: u32) -> Result<LogEntry, Error> {
        let mut entries = self.run_log(path, Rev::Number(rev), &rev.to_string())?;
        if entries.len() != 1 || entries[0].rev != rev {
            return Err(Error::malformed(
                "svn log XML",
                format!(
                    "expected exactly revision {rev} of {path}, got {} entries",
                    entries.len(),
                ),
            ));
        }
        Ok(entries.remove(0))
    }

    fn export(&self, path: &str, rev: u32, dest: &Path) -> Result<(), Error> {
        let target = format!("{}{}/@{rev}", self.repo_url, path.trim_end_matches('/'));

        tool::run(
            Command::new("svn")
                .arg("export")
                .arg("--non-interactive")
                .arg("--quiet")
                .arg("--ignore-externals")
                .arg("-r")
                .arg(rev.to_string())
                .arg(target)
                .arg(dest),
        )?;
        Ok(())
    }
}
