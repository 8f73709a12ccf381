use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::Error;
use crate::tool;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Signature {
    pub(crate) name: String,
    pub(crate) email: String,
    /// Any date format git accepts, passed through untouched.
    pub(crate) date: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommitMeta {
    pub(crate) author: Signature,
    pub(crate) committer: Signature,
    pub(crate) message: String,
}

/// Non-bare repository driven through the `git` command line client.
pub(crate) struct GitRepo {
    work_dir: PathBuf,
}

impl GitRepo {
    /// Creates a new repository at `work_dir`. An existing repository is
    /// never reused.
    pub(crate) fn init(work_dir: &Path) -> Result<Self, Error> {
        if work_dir.join(".git").exists() {
            return Err(Error::malformed(
                "destination",
                format!("{work_dir:?} already contains a git repository"),
            ));
        }
        std::fs::create_dir_all(work_dir)
            .map_err(|e| Error::io(format!("failed to create {work_dir:?}"), e))?;

        let repo = Self::open(work_dir)?;
        tool::run(repo.git().arg("init").arg("--quiet"))?;
        tracing::info!("initialized git repository at {work_dir:?}");
        Ok(repo)
    }

    /// Paths handed to `git` are resolved against `work_dir`, so it is
    /// stored as an absolute path.
    pub(crate) fn open(work_dir: &Path) -> Result<Self, Error> {
        let work_dir = std::path::absolute(work_dir)
            .map_err(|e| Error::io(format!("failed to resolve {work_dir:?}"), e))?;
        Ok(Self { work_dir })
    }

    #[inline]
    pub(crate) fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&self.work_dir)
            .arg("-c")
            .arg("commit.gpgsign=false")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .env_remove("GIT_INDEX_FILE");
        cmd
    }

    /// Stages every change of the working tree, deletions included.
    pub(crate) fn add_all(&self) -> Result<(), Error> {
        tool::run(self.git().arg("add").arg("--all").arg("."))?;
        Ok(())
    }

    /// Commits the index, even when nothing changed since the last commit.
    ///
    /// The identities and dates of `meta` only apply to this commit.
    pub(crate) fn commit(&self, meta: &CommitMeta) -> Result<(), Error> {
        let msg_path = self.work_dir.join(".git").join("S2G_COMMIT_MSG");
        std::fs::write(&msg_path, &meta.message)
            .map_err(|e| Error::io(format!("failed to write {msg_path:?}"), e))?;

        let mut cmd = self.git();
        cmd.arg("commit")
            .arg("--quiet")
            .arg("--no-verify")
            .arg("--allow-empty")
            .arg("--allow-empty-message")
            .arg("--cleanup=verbatim")
            .arg("--file")
            .arg(&msg_path);
        set_author(&mut cmd, &meta.author);
        set_committer(&mut cmd, &meta.committer);
        tool::run(&mut cmd)?;

        if let Err(e) = std::fs::remove_file(&msg_path) {
            tracing::warn!("failed to remove {msg_path:?}: {e}");
        }
        Ok(())
    }

    /// Applies a mailbox patch with `git am`, keeping the subject intact
    /// and tolerating whitespace differences.
    pub(crate) fn am(&self, patch: &Path, committer: Option<&Signature>) -> Result<(), Error> {
        let mut cmd = self.git();
        cmd.arg("am").arg("-k").arg("--ignore-whitespace").arg(patch);
        if let Some(committer) = committer {
            set_committer(&mut cmd, committer);
        }
        tool::run_inherit(&mut cmd)
    }
}

fn set_author(cmd: &mut Command, author: &Signature) {
    cmd.env("GIT_AUTHOR_NAME", &author.name)
        .env("GIT_AUTHOR_EMAIL", &author.email)
        .env("GIT_AUTHOR_DATE", &author.date);
}

fn set_committer(cmd: &mut Command, committer: &Signature) {
    cmd.env("GIT_COMMITTER_NAME", &committer.name)
        .env("GIT_COMMITTER_EMAIL", &committer.email)
        .env("GIT_COMMITTER_DATE", &committer.date);
}


#[cfg(test)]
mod tests {
    use super::test_util::git_out;
    use super::{CommitMeta, GitRepo, Signature};
    use crate::errors::ErrorKind;
    use crate::workspace::Workspace;

    fn meta(name: &str, message: &str) -> CommitMeta {
        let sig = Signature {
            name: name.into(),
            email: format!("{}@example.org", name.to_lowercase()),
            date: "2008-01-19T16:03:22.122861Z".into(),
        };
        CommitMeta {
            author: sig.clone(),
            committer: sig,
            message: message.into(),
        }
    }

    #[test]
    fn test_commit_identity_and_empty() {
        let ws = Workspace::create(&std::env::temp_dir(), false).unwrap();
        let repo = GitRepo::init(&ws.git_dir()).unwrap();

        std::fs::write(ws.git_dir().join("a.txt"), "a").unwrap();
        repo.add_all().unwrap();
        repo.commit(&meta("Alice", "first\n\n# not a comment\n")).unwrap();

        repo.add_all().unwrap();
        repo.commit(&meta("Bob", "second\n")).unwrap();

        assert_eq!(git_out(&repo, &["rev-list", "--count", "HEAD"]), "2");
        assert_eq!(
            git_out(&repo, &["log", "-1", "--format=%an <%ae>|%cn <%ce>|%at|%ct"]),
            "Bob <bob@example.org>|Bob <bob@example.org>|1200758602|1200758602"
        );
        assert_eq!(
            git_out(&repo, &["log", "-1", "--format=%B", "HEAD~1"]),
            "first\n\n# not a comment"
        );
        assert_eq!(git_out(&repo, &["diff", "--name-only", "HEAD~1", "HEAD"]), "");
    }

    #[test]
    fn test_init_refuses_existing_repo() {
        let ws = Workspace::create(&std::env::temp_dir(), false).unwrap();
        GitRepo::init(&ws.git_dir()).unwrap();
        let Err(e) = GitRepo::init(&ws.git_dir()) else {
            panic!("second init should fail");
        };
        assert_eq!(e.kind(), ErrorKind::MalformedInput);
    }
}
