use crate::errors::Error;
use crate::rev_list::RevisionRecord;
use crate::svn::{LogEntry, Rev, SvnSource};

/// What to do when one log entry records the traced path as copied from
/// more than one distinct source.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum CopySourcePolicy {
    /// Follow the last candidate in log order.
    LastWins,
    /// Stop the trace with an error.
    Reject,
}

/// Walks the history of a path backwards, following copies.
///
/// Yields one record per log entry, newest first. Each record carries the
/// name the path had at that revision. The trace ends when the log is
/// exhausted or after revision 0.
pub(crate) struct Trace {
    entries: std::vec::IntoIter<LogEntry>,
    current_path: String,
    policy: CopySourcePolicy,
    prev_rev: Option<u32>,
    done: bool,
}

pub(crate) fn trace(
    source: &dyn SvnSource,
    path: &str,
    start: Rev,
    policy: CopySourcePolicy,
) -> Result<Trace, Error> {
    tracing::info!("tracing {path}@{start}");
    let entries = source.log(path, start, 0)?;
    tracing::debug!("log of {path}@{start} has {} entries", entries.len());

    Ok(Trace {
        entries: entries.into_iter(),
        current_path: path.into(),
        policy,
        prev_rev: None,
        done: false,
    })
}

impl Trace {
    fn step(&mut self, entry: LogEntry) -> Result<RevisionRecord, Error> {
        if let Some(prev_rev) = self.prev_rev {
            if entry.rev >= prev_rev {
                return Err(Error::malformed(
                    "svn log",
                    format!("revision {} follows revision {prev_rev}", entry.rev),
                ));
            }
        }
        self.prev_rev = Some(entry.rev);

        let record = RevisionRecord {
            rev: entry.rev,
            path: self.current_path.clone(),
        };

        let mut copy_source = None::<&str>;
        for change in entry.changes.iter() {
            if change.path != self.current_path {
                continue;
            }
            let Some(ref copy_from) = change.copy_from else {
                continue;
            };

            if let Some(prev_source) = copy_source {
                if prev_source != copy_from.path {
                    match self.policy {
                        CopySourcePolicy::LastWins => {
                            tracing::warn!(
                                "r{}: {} has several copy sources, {prev_source} ignored",
                                entry.rev,
                                self.current_path,
                            );
                        }
                        CopySourcePolicy::Reject => {
                            return Err(Error::malformed(
                                "svn log",
                                format!(
                                    "r{}: {} is copied from both {prev_source} and {}",
                                    entry.rev, self.current_path, copy_from.path,
                                ),
                            ));
                        }
                    }
                }
            }
            copy_source = Some(copy_from.path.as_str());
        }

        if let Some(copy_source) = copy_source {
            tracing::debug!(
                "r{}: {} was copied from {copy_source}",
                entry.rev,
                self.current_path,
            );
            self.current_path = copy_source.into();
        }

        Ok(record)
    }
}

impl Iterator for Trace {
    type Item = Result<RevisionRecord, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let Some(entry) = self.entries.next() else {
            self.done = true;
            return None;
        };

        let r = self.step(entry);
        self.done = match r {
            Ok(ref record) => record.rev == 0,
            Err(_) => true,
        };
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::{CopySourcePolicy, trace};
    use crate::errors::ErrorKind;
    use crate::rev_list::RevisionRecord;
    use crate::svn::fake::{FakeSvn, change, copy};
    use crate::svn::{ChangeAction, Rev};

    fn collect(
        svn: &FakeSvn,
        path: &str,
        start: Rev,
        policy: CopySourcePolicy,
    ) -> Vec<(u32, String)> {
        trace(svn, path, start, policy)
            .unwrap()
            .map(|r| r.map(|RevisionRecord { rev, path }| (rev, path)))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn renamed_repo() -> FakeSvn {
        let mut svn = FakeSvn::new();
        svn.commit(1, Some("alice"), "init", vec![change("/trunk", ChangeAction::Add)], &[]);
        svn.commit(
            7,
            Some("alice"),
            "add bar",
            vec![change("/trunk/bar", ChangeAction::Add)],
            &[],
        );
        svn.commit(
            15,
            Some("bob"),
            "edit bar",
            vec![change("/trunk/bar", ChangeAction::Modify)],
            &[],
        );
        svn.commit(
            20,
            Some("bob"),
            "rename bar to foo",
            vec![
                change("/trunk/bar", ChangeAction::Delete),
                copy("/trunk/foo", "/trunk/bar", 15),
            ],
            &[],
        );
        svn.commit(
            21,
            Some("alice"),
            "edit foo",
            vec![change("/trunk/foo", ChangeAction::Modify)],
            &[],
        );
        svn
    }

    #[test]
    fn test_follows_rename() {
        let svn = renamed_repo();
        let records = collect(
            &svn,
            "/trunk/foo",
            Rev::Number(20),
            CopySourcePolicy::LastWins,
        );

        assert_eq!(
            records,
            [
                (20, "/trunk/foo".to_string()),
                (15, "/trunk/bar".to_string()),
                (7, "/trunk/bar".to_string()),
                (1, "/trunk/bar".to_string()),
            ]
        );
    }

    #[test]
    fn test_strictly_decreasing_and_terminates() {
        let mut svn = renamed_repo();
        svn.commit(0, None, "", vec![], &[]);

        let records = collect(&svn, "/trunk/foo", Rev::Head, CopySourcePolicy::LastWins);
        assert_eq!(records.first().map(|r| r.0), Some(21));
        assert_eq!(records.last().map(|r| r.0), Some(0));
        assert!(records.windows(2).all(|w| w[0].0 > w[1].0));
    }

    #[test]
    fn test_unrelated_changes_keep_path() {
        let mut svn = FakeSvn::new();
        svn.commit(
            3,
            Some("alice"),
            "copy elsewhere",
            vec![copy("/branches/x", "/trunk", 2)],
            &[],
        );
        svn.commit(2, Some("alice"), "edit", vec![change("/trunk/a", ChangeAction::Modify)], &[]);

        let records = collect(&svn, "/trunk", Rev::Head, CopySourcePolicy::LastWins);
        assert_eq!(
            records,
            [(3, "/trunk".to_string()), (2, "/trunk".to_string())]
        );
    }

    fn ambiguous_repo() -> FakeSvn {
        let mut svn = FakeSvn::new();
        svn.commit(
            10,
            Some("alice"),
            "odd history",
            vec![
                copy("/trunk/foo", "/trunk/first", 9),
                copy("/trunk/foo", "/trunk/second", 9),
            ],
            &[],
        );
        svn.commit(9, Some("alice"), "before", vec![], &[]);
        svn
    }

    #[test]
    fn test_ambiguous_copy_last_wins() {
        let svn = ambiguous_repo();
        let records = collect(&svn, "/trunk/foo", Rev::Head, CopySourcePolicy::LastWins);
        assert_eq!(
            records,
            [(10, "/trunk/foo".to_string()), (9, "/trunk/second".to_string())]
        );
    }

    #[test]
    fn test_ambiguous_copy_reject() {
        let svn = ambiguous_repo();
        let mut t = trace(&svn, "/trunk/foo", Rev::Head, CopySourcePolicy::Reject).unwrap();
        let e = t.next().unwrap().unwrap_err();
        assert_eq!(e.kind(), ErrorKind::MalformedInput);
        assert!(t.next().is_none());
    }

    #[test]
    fn test_duplicate_identical_copy_is_not_ambiguous() {
        let mut svn = FakeSvn::new();
        svn.commit(
            5,
            Some("alice"),
            "dup",
            vec![copy("/a", "/b", 4), copy("/a", "/b", 4)],
            &[],
        );
        svn.commit(4, Some("alice"), "b", vec![], &[]);
        let records = collect(&svn, "/a", Rev::Head, CopySourcePolicy::Reject);
        assert_eq!(records, [(5, "/a".to_string()), (4, "/b".to_string())]);
    }
}
