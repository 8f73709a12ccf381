use super::{ChangeAction, CopyFrom, LogEntry, NodeKind, PathChange};
use crate::errors::Error;

// Output of `svn log --xml -v`:
//
// <log>
// <logentry revision="3423">
// <author>ftyers</author>
// <date>2008-01-19T16:03:22.122861Z</date>
// <paths>
// <path action="D" prop-mods="false" text-mods="false" kind="dir">/apertium-unicode</path>
// <path action="A" prop-mods="false" text-mods="false" kind="dir"
//    copyfrom-path="/apertium-unicode" copyfrom-rev="3416">/trunk/apertium-unicode</path>
// </paths>
// <msg>Moving unicode apertium to trunk  </msg>
// </logentry>
// </log>

/// Parses the XML produced by `svn log --xml`, keeping the entries in
/// document order.
pub(crate) fn parse_log(xml: &str) -> Result<Vec<LogEntry>, Error> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| Error::malformed("svn log XML", e.to_string()))?;

    let root = doc.root_element();
    if !root.has_tag_name("log") {
        return Err(Error::malformed(
            "svn log XML",
            format!("unexpected root element <{}>", root.tag_name().name()),
        ));
    }

    root.children()
        .filter(|node| node.has_tag_name("logentry"))
        .map(parse_entry)
        .collect()
}

fn parse_entry(node: roxmltree::Node<'_, '_>) -> Result<LogEntry, Error> {
    let rev = parse_rev_attr(node, "revision")?.ok_or_else(|| {
        Error::malformed("svn log XML", "<logentry> without revision attribute")
    })?;

    let mut entry = LogEntry {
        rev,
        author: None,
        date: None,
        message: String::new(),
        changes: Vec::new(),
    };

    for child in node.children().filter(roxmltree::Node::is_element) {
        match child.tag_name().name() {
            "author" => entry.author = Some(child.text().unwrap_or_default().into()),
            "date" => {
                let date = child.text().unwrap_or_default();
                if chrono::DateTime::parse_from_rfc3339(date).is_err() {
                    return Err(Error::malformed(
                        "svn log XML",
                        format!("invalid date {date:?} in revision {rev}"),
                    ));
                }
                entry.date = Some(date.into());
            }
            "msg" => entry.message = child.text().unwrap_or_default().trim().into(),
            "paths" => {
                for path_node in child.children().filter(|n| n.has_tag_name("path")) {
                    entry.changes.push(parse_path(path_node, rev)?);
                }
            }
            other => {
                tracing::trace!("ignoring <{other}> in revision {rev}");
            }
        }
    }

    Ok(entry)
}

fn parse_path(node: roxmltree::Node<'_, '_>, rev: u32) -> Result<PathChange, Error> {
    let raw_action = node.attribute("action").unwrap_or_default();
    let action = ChangeAction::parse(raw_action).ok_or_else(|| {
        Error::malformed(
            "svn log XML",
            format!("invalid path action {raw_action:?} in revision {rev}"),
        )
    })?;

    let kind = match node.attribute("kind") {
        None | Some("") | Some("none") => None,
        Some(raw_kind) => Some(NodeKind::parse(raw_kind).ok_or_else(|| {
            Error::malformed(
                "svn log XML",
                format!("invalid node kind {raw_kind:?} in revision {rev}"),
            )
        })?),
    };

    let copy_from_path = node.attribute("copyfrom-path");
    let copy_from_rev = parse_rev_attr(node, "copyfrom-rev")?;
    let copy_from = match (copy_from_path, copy_from_rev) {
        (Some(path), Some(from_rev)) => Some(CopyFrom {
            path: path.into(),
            rev: from_rev,
        }),
        (None, None) => None,
        _ => {
            return Err(Error::malformed(
                "svn log XML",
                format!("incomplete copy source in revision {rev}"),
            ));
        }
    };

    Ok(PathChange {
        path: node.text().unwrap_or_default().into(),
        action,
        kind,
        copy_from,
    })
}

fn parse_rev_attr(node: roxmltree::Node<'_, '_>, name: &str) -> Result<Option<u32>, Error> {
    node.attribute(name)
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| {
                Error::malformed("svn log XML", format!("invalid {name} {raw:?}"))
            })
        })
        .transpose()
}
