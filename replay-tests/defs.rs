use std::collections::BTreeMap;

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Test {
    #[serde(rename = "svn-uuid")]
    pub(crate) svn_uuid: Option<String>,
    /// Revisions 1, 2, ... of the source repository.
    #[serde(rename = "svn-revs")]
    pub(crate) svn_revs: Vec<SvnRev>,
    #[serde(rename = "user-map")]
    pub(crate) user_map: String,
    /// Extra lines of the import parameters file.
    #[serde(rename = "import-params", default = "String::new")]
    pub(crate) import_params: String,
    pub(crate) trace: Option<TraceStep>,
    pub(crate) import: Option<ImportStep>,
    #[serde(rename = "logs")]
    pub(crate) logs: Option<String>,
    #[serde(rename = "commit-count")]
    pub(crate) commit_count: Option<usize>,
    #[serde(rename = "git-revs", default = "Vec::new")]
    pub(crate) git_revs: Vec<GitRev>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SvnRev {
    #[serde(default = "BTreeMap::new")]
    pub(crate) props: BTreeMap<String, String>,
    #[serde(default = "Vec::new")]
    pub(crate) nodes: Vec<SvnNode>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SvnNode {
    pub(crate) path: String,
    pub(crate) kind: Option<SvnNodeKind>,
    pub(crate) action: SvnNodeAction,
    #[serde(rename = "copy-from-path")]
    pub(crate) copy_from_path: Option<String>,
    #[serde(rename = "copy-from-rev")]
    pub(crate) copy_from_rev: Option<u32>,
    pub(crate) props: Option<BTreeMap<String, String>>,
    pub(crate) text: Option<String>,
}

#[derive(serde::Deserialize)]
pub(crate) enum SvnNodeKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Dir,
}

#[derive(serde::Deserialize)]
pub(crate) enum SvnNodeAction {
    #[serde(rename = "change")]
    Change,
    #[serde(rename = "add")]
    Add,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "replace")]
    Replace,
}

/// Runs `s2g trace` and writes the revision list used by the import.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TraceStep {
    pub(crate) path: String,
    pub(crate) rev: Option<String>,
    #[serde(rename = "strict-copies", default = "false_")]
    pub(crate) strict_copies: bool,
    #[serde(rename = "failed", default = "false_")]
    pub(crate) failed: bool,
    pub(crate) output: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ImportStep {
    /// Revision list; the output of the trace step when absent.
    pub(crate) revs: Option<String>,
    #[serde(rename = "failed", default = "false_")]
    pub(crate) failed: bool,
    pub(crate) stdout: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GitRev {
    pub(crate) rev: String,
    pub(crate) author: Option<GitSignature>,
    pub(crate) committer: Option<GitSignature>,
    pub(crate) message: Option<String>,
    pub(crate) tree: Option<BTreeMap<String, GitTreeEntry>>,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GitSignature {
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) seconds: Option<i64>,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub(crate) enum GitTreeEntry {
    #[serde(rename = "normal")]
    Normal { data: String },
    #[serde(rename = "exec")]
    Exec { data: String },
    #[serde(rename = "dir")]
    Dir,
}

#[inline(always)]
fn false_() -> bool {
    false
}
