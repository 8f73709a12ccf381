use std::path::Path;

use regex_automata::meta::Regex;

use crate::errors::Error;
use crate::git::{GitRepo, Signature};

// Only the header right after the mbox separator line is considered.
const HEADER_PATTERN: &str = r"From: (.+?) <([^<>]+)>\nDate: ([^\n]+)";

/// Extracts the identity of the patch author from a `git format-patch`
/// mail: `From: Name <email>` followed by `Date: ...` on lines 2 and 3.
pub(crate) fn parse_header(regex: &Regex, patch: &str) -> Option<Signature> {
    let header = patch.lines().skip(1).take(2).collect::<Vec<_>>().join("\n");

    let mut caps = regex.create_captures();
    regex.captures(header.as_str(), &mut caps);
    if !caps.is_match() {
        return None;
    }

    let name = &header[caps.get_group(1)?.range()];
    let email = &header[caps.get_group(2)?.range()];
    let date = &header[caps.get_group(3)?.range()];

    if chrono::DateTime::parse_from_rfc2822(date).is_err() {
        tracing::warn!("patch date {date:?} is not RFC 2822, passing it to git as is");
    }

    Some(Signature {
        name: name.into(),
        email: email.into(),
        date: date.into(),
    })
}

/// Applies `patch_path` to `repo` with the patch author as committer.
///
/// Returns whether the patch was applied. A patch whose header cannot be
/// parsed is an error, or is skipped when `skip_unparsable` is set.
pub(crate) fn apply(repo: &GitRepo, patch_path: &Path, skip_unparsable: bool) -> Result<bool, Error> {
    let patch = std::fs::read(patch_path)
        .map_err(|e| Error::io(format!("failed to read {patch_path:?}"), e))?;
    let patch = String::from_utf8_lossy(&patch);

    let regex = header_regex()?;
    let Some(committer) = parse_header(&regex, &patch) else {
        if skip_unparsable {
            tracing::warn!("skipping {patch_path:?}: no \"From:\"/\"Date:\" header");
            return Ok(false);
        }
        return Err(Error::malformed(
            format!("patch {patch_path:?}"),
            "expected \"From: Name <email>\" and \"Date: ...\" on lines 2 and 3",
        ));
    };

    tracing::info!(
        "applying {patch_path:?} as {} <{}> at {}",
        committer.name,
        committer.email,
        committer.date,
    );
    let patch_path = std::path::absolute(patch_path)
        .map_err(|e| Error::io(format!("failed to resolve {patch_path:?}"), e))?;
    repo.am(&patch_path, Some(&committer))?;
    Ok(true)
}

fn header_regex() -> Result<Regex, Error> {
    Regex::new(HEADER_PATTERN).map_err(|e| Error::malformed("patch header pattern", e.to_string()))
}
