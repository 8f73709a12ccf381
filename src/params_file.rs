use std::path::PathBuf;

/// Parameters of `s2g import`, read from a TOML file.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ImportParams {
    /// URL used to access the repository (e.g. a local `file://` mirror).
    #[serde(rename = "repo-url")]
    pub(crate) repo_url: Option<String>,
    /// Public URL of the repository, recorded in commit messages.
    #[serde(rename = "svn-url")]
    pub(crate) svn_url: Option<String>,
    #[serde(rename = "svn-uuid")]
    pub(crate) svn_uuid: Option<String>,
    #[serde(rename = "user-map-file")]
    pub(crate) user_map_file: Option<PathBuf>,
    #[serde(rename = "workspace-dir")]
    pub(crate) workspace_dir: Option<PathBuf>,
    #[serde(rename = "keep-workspace", default = "true_")]
    pub(crate) keep_workspace: bool,
    #[serde(rename = "commit-msg-template")]
    pub(crate) commit_msg_template: Option<String>,
}

impl Default for ImportParams {
    fn default() -> Self {
        Self {
            repo_url: None,
            svn_url: None,
            svn_uuid: None,
            user_map_file: None,
            workspace_dir: None,
            keep_workspace: true,
            commit_msg_template: None,
        }
    }
}

#[inline(always)]
fn true_() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::ImportParams;

    #[test]
    fn test_parse() {
        let params: ImportParams = toml::from_str(indoc::indoc! {r#"
            repo-url = "file:///home/apertium/svn-mirror/apertium-sf-net"
            svn-url = "https://svn.code.sf.net/p/apertium/svn"
            svn-uuid = "72bbbca6-d526-0410-a7d9-f06f51895060"
            user-map-file = "authors.txt"
            keep-workspace = false
        "#})
        .unwrap();

        assert_eq!(
            params.repo_url.as_deref(),
            Some("file:///home/apertium/svn-mirror/apertium-sf-net")
        );
        assert_eq!(
            params.svn_uuid.as_deref(),
            Some("72bbbca6-d526-0410-a7d9-f06f51895060")
        );
        assert!(!params.keep_workspace);
        assert!(params.commit_msg_template.is_none());
    }

    #[test]
    fn test_defaults_and_unknown_keys() {
        let params: ImportParams = toml::from_str("").unwrap();
        assert!(params.keep_workspace);
        assert!(toml::from_str::<ImportParams>("branches = []").is_err());
    }
}
