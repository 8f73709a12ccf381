use crate::errors::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RevisionRecord {
    pub(crate) rev: u32,
    pub(crate) path: String,
}

impl std::fmt::Display for RevisionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.rev, self.path)
    }
}

/// Parses a revision list, one `<revision> <path>` pair per line.
///
/// Blank lines and `#` comments are skipped. The path is everything after
/// the first space, so paths containing spaces survive.
pub(crate) fn parse(src: &str, src_name: &str) -> Result<Vec<RevisionRecord>, Error> {
    let mut records = Vec::new();
    for (line_i, line) in src.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let malformed =
            |reason: &str| Error::malformed(format!("{src_name} line {}", line_i + 1), reason);

        let Some((raw_rev, path)) = line.trim_start().split_once(' ') else {
            return Err(malformed("expected \"<revision> <path>\""));
        };
        let rev = raw_rev
            .parse::<u32>()
            .map_err(|_| malformed(&format!("invalid revision {raw_rev:?}")))?;
        if !path.starts_with('/') {
            return Err(malformed(&format!(
                "path {path:?} is not relative to the repository root"
            )));
        }

        records.push(RevisionRecord {
            rev,
            path: path.into(),
        });
    }
    Ok(records)
}

/// Sorts records oldest first, by numeric revision ("9" before "10"). The
/// sort is stable, so records sharing a revision keep their input order.
pub(crate) fn sort_for_replay(records: &mut [RevisionRecord]) {
    records.sort_by_key(|record| record.rev);
}
