use std::collections::BTreeMap;
use std::path::Path;

use super::{ChangeAction, CopyFrom, LogEntry, PathChange, Rev, SvnSource};
use crate::errors::Error;

/// In-memory repository for tests. Each revision holds a full snapshot
/// of the repository files.
#[derive(Default)]
pub(crate) struct FakeSvn {
    entries: Vec<LogEntry>,
    trees: BTreeMap<u32, BTreeMap<String, Vec<u8>>>,
}

impl FakeSvn {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn commit(
        &mut self,
        rev: u32,
        author: Option<&str>,
        message: &str,
        changes: Vec<PathChange>,
        files: &[(&str, &str)],
    ) {
        self.entries.push(LogEntry {
            rev,
            author: author.map(Into::into),
            date: Some(format!("2008-01-{:02}T12:00:00.000000Z", rev % 28 + 1)),
            message: message.into(),
            changes,
        });
        self.entries.sort_by(|a, b| b.rev.cmp(&a.rev));
        self.trees.insert(
            rev,
            files
                .iter()
                .map(|&(path, data)| (path.into(), data.as_bytes().to_vec()))
                .collect(),
        );
    }
}

pub(crate) fn change(path: &str, action: ChangeAction) -> PathChange {
    PathChange {
        path: path.into(),
        action,
        kind: None,
        copy_from: None,
    }
}

pub(crate) fn copy(path: &str, from_path: &str, from_rev: u32) -> PathChange {
    PathChange {
        path: path.into(),
        action: ChangeAction::Add,
        kind: None,
        copy_from: Some(CopyFrom {
            path: from_path.into(),
            rev: from_rev,
        }),
    }
}

impl SvnSource for FakeSvn {
    fn log(&self, _path: &str, peg: Rev, end: u32) -> Result<Vec<LogEntry>, Error> {
        let start = match peg {
            Rev::Head => u32::MAX,
            Rev::Number(n) => n,
        };
        Ok(self
            .entries
            .iter()
            .filter(|e| e.rev <= start && e.rev >= end)
            .cloned()
            .collect())
    }

    fn log_rev(&self, path: &str, rev: u32) -> Result<LogEntry, Error> {
        self.entries
            .iter()
            .find(|e| e.rev == rev)
            .cloned()
            .ok_or_else(|| Error::malformed("svn log XML", format!("no {path}@{rev}")))
    }

    fn export(&self, path: &str, rev: u32, dest: &Path) -> Result<(), Error> {
        let tree = self
            .trees
            .get(&rev)
            .ok_or_else(|| Error::malformed("svn export", format!("no revision {rev}")))?;

        std::fs::create_dir(dest)
            .map_err(|e| Error::io(format!("failed to create {dest:?}"), e))?;

        let prefix = format!("{}/", path.trim_end_matches('/'));
        for (file_path, data) in tree.iter() {
            let Some(rel_path) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            let file_dest = dest.join(rel_path);
            if let Some(parent) = file_dest.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::io(format!("failed to create {parent:?}"), e))?;
            }
            std::fs::write(&file_dest, data)
                .map_err(|e| Error::io(format!("failed to write {file_dest:?}"), e))?;
        }
        Ok(())
    }
}
