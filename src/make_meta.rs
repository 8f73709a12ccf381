use crate::errors::Error;
use crate::git::{CommitMeta, Signature};
use crate::svn::LogEntry;
use crate::user_map::UserMap;

pub(crate) const DEFAULT_COMMIT_MSG_TEMPLATE: &str = indoc::indoc! {r#"
    {% if svn_log %}{{ svn_log }}

    {% endif %}git-svn-id: {{ svn_url }}{{ svn_path }}@{{ svn_rev }}{% if svn_uuid %} {{ svn_uuid }}{% endif %}
"#};

/// Builds the metadata of the commit replaying one Subversion revision.
pub(crate) struct GitMetaMaker<'a> {
    user_map: &'a UserMap,
    svn_url: &'a str,
    svn_uuid: Option<uuid::Uuid>,
    jinja_env: minijinja::Environment<'a>,
}

impl<'a> GitMetaMaker<'a> {
    pub(crate) fn new(
        user_map: &'a UserMap,
        svn_url: &'a str,
        svn_uuid: Option<uuid::Uuid>,
        commit_msg_template: &'a str,
    ) -> Result<Self, Error> {
        let mut jinja_env = minijinja::Environment::empty();
        jinja_env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        jinja_env
            .add_template("commit_msg", commit_msg_template)
            .map_err(|e| Error::malformed("commit message template", e.to_string()))?;

        Ok(Self {
            user_map,
            svn_url: svn_url.trim_end_matches('/'),
            svn_uuid,
            jinja_env,
        })
    }

    /// Fails with [`Error::UnmappedAuthor`] when the author of `entry` has
    /// no mapping at that revision.
    pub(crate) fn make_commit_meta(
        &self,
        svn_path: &str,
        entry: &LogEntry,
    ) -> Result<CommitMeta, Error> {
        let svn_author = entry.author.as_deref().unwrap_or_default();
        let (name, email) = self
            .user_map
            .get(svn_author, entry.rev)
            .ok_or_else(|| Error::UnmappedAuthor {
                author: svn_author.into(),
                rev: entry.rev,
            })?;

        let date = entry.date.as_deref().ok_or_else(|| {
            Error::malformed("svn log", format!("revision {} has no date", entry.rev))
        })?;

        let jinja_ctx = JinjaCtx {
            svn_url: self.svn_url.into(),
            svn_uuid: self.svn_uuid.map(|u| u.to_string()).unwrap_or_default(),
            svn_rev: entry.rev,
            svn_path: svn_path.into(),
            svn_author: svn_author.into(),
            svn_date: date.into(),
            svn_log: entry.message.clone(),
            mapped_author_name: name.into(),
            mapped_author_email: email.into(),
        };

        let mut message = self
            .jinja_env
            .get_template("commit_msg")
            .and_then(|template| template.render(&jinja_ctx))
            .map_err(|e| Error::malformed("commit message template", e.to_string()))?
            .replace("\r\n", "\n");
        if !message.ends_with('\n') {
            message.push('\n');
        }

        let signature = Signature {
            name: name.into(),
            email: email.into(),
            date: date.into(),
        };

        Ok(CommitMeta {
            author: signature.clone(),
            committer: signature,
            message,
        })
    }
}

#[derive(serde::Serialize)]
struct JinjaCtx {
    svn_url: String,
    svn_uuid: String,
    svn_rev: u32,
    svn_path: String,
    svn_author: String,
    svn_date: String,
    svn_log: String,
    mapped_author_name: String,
    mapped_author_email: String,
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_COMMIT_MSG_TEMPLATE, GitMetaMaker};
    use crate::errors::{Error, ErrorKind};
    use crate::svn::LogEntry;
    use crate::user_map::UserMap;

    fn entry(author: Option<&str>, message: &str) -> LogEntry {
        LogEntry {
            rev: 3423,
            author: author.map(Into::into),
            date: Some("2008-01-19T16:03:22.122861Z".into()),
            message: message.into(),
            changes: Vec::new(),
        }
    }

    fn user_map() -> UserMap {
        let mut user_map = UserMap::new();
        user_map.insert("ftyers", "Francis Tyers", "ftyers@example.org");
        user_map
    }

    #[test]
    fn test_default_message() {
        let user_map = user_map();
        let uuid = uuid::Uuid::parse_str("72bbbca6-d526-0410-a7d9-f06f51895060").unwrap();
        let maker = GitMetaMaker::new(
            &user_map,
            "https://svn.code.sf.net/p/apertium/svn/",
            Some(uuid),
            DEFAULT_COMMIT_MSG_TEMPLATE,
        )
        .unwrap();

        let meta = maker
            .make_commit_meta(
                "/trunk/apertium-unicode",
                &entry(Some("ftyers"), "Moving unicode apertium to trunk"),
            )
            .unwrap();
        assert_eq!(
            meta.message,
            "Moving unicode apertium to trunk\n\n\
             git-svn-id: https://svn.code.sf.net/p/apertium/svn/trunk/apertium-unicode@3423 \
             72bbbca6-d526-0410-a7d9-f06f51895060\n"
        );
        assert_eq!(meta.author.name, "Francis Tyers");
        assert_eq!(meta.author.email, "ftyers@example.org");
        assert_eq!(meta.author.date, "2008-01-19T16:03:22.122861Z");
        assert_eq!(meta.committer, meta.author);
    }

    #[test]
    fn test_empty_log_and_no_uuid() {
        let user_map = user_map();
        let maker =
            GitMetaMaker::new(&user_map, "file:///srv/svn", None, DEFAULT_COMMIT_MSG_TEMPLATE)
                .unwrap();
        let meta = maker
            .make_commit_meta("/trunk", &entry(Some("ftyers"), ""))
            .unwrap();
        assert_eq!(meta.message, "git-svn-id: file:///srv/svn/trunk@3423\n");
    }

    #[test]
    fn test_custom_template() {
        let user_map = user_map();
        let maker = GitMetaMaker::new(
            &user_map,
            "file:///srv/svn",
            None,
            "{{ svn_log }} ({{ svn_author }} as {{ mapped_author_name }}, r{{ svn_rev }})",
        )
        .unwrap();
        let meta = maker
            .make_commit_meta("/trunk", &entry(Some("ftyers"), "fix"))
            .unwrap();
        assert_eq!(meta.message, "fix (ftyers as Francis Tyers, r3423)\n");

        let Err(e) = GitMetaMaker::new(&user_map, "", None, "{{ svn_nope }") else {
            panic!("template should not parse");
        };
        assert_eq!(e.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_unmapped_author() {
        let user_map = user_map();
        let maker =
            GitMetaMaker::new(&user_map, "file:///srv/svn", None, DEFAULT_COMMIT_MSG_TEMPLATE)
                .unwrap();

        let e = maker
            .make_commit_meta("/trunk", &entry(Some("FTyers"), "fix"))
            .unwrap_err();
        assert!(matches!(
            e,
            Error::UnmappedAuthor { ref author, rev: 3423 } if author == "FTyers"
        ));

        let e = maker
            .make_commit_meta("/trunk", &entry(None, "fix"))
            .unwrap_err();
        assert_eq!(e.kind(), ErrorKind::UnmappedAuthor);
    }
}
