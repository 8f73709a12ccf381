use std::path::{Path, PathBuf};

use crate::errors::Error;

/// Staging directory of one replay run.
///
/// Holds `svn/`, recreated for every exported revision, and `git/`, the
/// target repository. The directory is removed on drop unless it is kept
/// for inspection.
pub(crate) struct Workspace {
    root: PathBuf,
    keep: bool,
}

impl Workspace {
    pub(crate) fn create(parent: &Path, keep: bool) -> Result<Self, Error> {
        use rand::{RngExt as _, SeedableRng as _};

        let mut rng = rand::rngs::StdRng::try_from_rng(&mut rand::rngs::SysRng)
            .expect("unexpected failure from SysRng");

        loop {
            let root = parent.join(format!("s2g-{:016x}", rng.random::<u64>()));
            match std::fs::create_dir(&root) {
                Ok(()) => {
                    tracing::info!("created workspace {root:?}");
                    return Ok(Self { root, keep });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    continue;
                }
                Err(e) => {
                    return Err(Error::io(format!("failed to create directory {root:?}"), e));
                }
            }
        }
    }

    #[inline]
    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn export_dir(&self) -> PathBuf {
        self.root().join("svn")
    }

    pub(crate) fn git_dir(&self) -> PathBuf {
        self.root().join("git")
    }

    /// Removes whatever a previous (possibly interrupted) export left.
    pub(crate) fn clear_export(&self) -> Result<(), Error> {
        let export_dir = self.export_dir();
        match std::fs::remove_dir_all(&export_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(format!("failed to remove {export_dir:?}"), e)),
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!("leaving workspace {:?}", self.root);
        } else if let Err(e) = std::fs::remove_dir_all(&self.root) {
            tracing::warn!("failed to remove workspace {:?}: {e}", self.root);
        } else {
            tracing::debug!("removed workspace {:?}", self.root);
        }
    }
}
