use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::Error;

/// Name never copied nor deleted, at any depth.
const EXCLUDED_NAME: &str = ".git";

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct MirrorStats {
    pub(crate) written: usize,
    pub(crate) unchanged: usize,
    pub(crate) removed: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum EntryType {
    Dir,
    File,
    Symlink,
}

impl EntryType {
    fn of(file_type: std::fs::FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Dir
        } else {
            Self::File
        }
    }
}

/// Makes the tree under `dst` identical to the tree under `src`.
///
/// Entries of `dst` that do not exist in `src`, or exist with a different
/// type, are deleted. Files whose contents and permissions already match
/// are left alone.
pub(crate) fn mirror(src: &Path, dst: &Path) -> Result<MirrorStats, Error> {
    let mut stats = MirrorStats::default();

    let mut removed_dirs = Vec::<PathBuf>::new();
    for (rel_path, dst_type) in list_tree(dst)? {
        if removed_dirs.iter().any(|dir| rel_path.starts_with(dir)) {
            continue;
        }

        let src_path = src.join(&rel_path);
        let src_type = match std::fs::symlink_metadata(&src_path) {
            Ok(meta) => Some(EntryType::of(meta.file_type())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::io(format!("failed to stat {src_path:?}"), e)),
        };
        if src_type == Some(dst_type) {
            continue;
        }

        let dst_path = dst.join(&rel_path);
        tracing::trace!("removing {dst_path:?}");
        let r = if dst_type == EntryType::Dir {
            removed_dirs.push(rel_path);
            std::fs::remove_dir_all(&dst_path)
        } else {
            std::fs::remove_file(&dst_path)
        };
        r.map_err(|e| Error::io(format!("failed to remove {dst_path:?}"), e))?;
        stats.removed += 1;
    }

    for (rel_path, src_type) in list_tree(src)? {
        let src_path = src.join(&rel_path);
        let dst_path = dst.join(&rel_path);

        match src_type {
            EntryType::Dir => {
                std::fs::create_dir_all(&dst_path)
                    .map_err(|e| Error::io(format!("failed to create {dst_path:?}"), e))?;
            }
            EntryType::File => {
                if copy_file(&src_path, &dst_path)? {
                    stats.written += 1;
                } else {
                    stats.unchanged += 1;
                }
            }
            EntryType::Symlink => {
                if copy_symlink(&src_path, &dst_path)? {
                    stats.written += 1;
                } else {
                    stats.unchanged += 1;
                }
            }
        }
    }

    tracing::debug!(
        "mirrored {src:?} into {dst:?}: {} written, {} unchanged, {} removed",
        stats.written,
        stats.unchanged,
        stats.removed,
    );

    Ok(stats)
}

/// Lists everything under `root`, parents before children.
fn list_tree(root: &Path) -> Result<Vec<(PathBuf, EntryType)>, Error> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != EXCLUDED_NAME)
    {
        let entry = entry.map_err(|e| {
            Error::io(format!("failed to list {root:?}"), std::io::Error::from(e))
        })?;
        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            unreachable!("{:?} is not under {root:?}", entry.path());
        };
        entries.push((rel_path.to_path_buf(), EntryType::of(entry.file_type())));
    }
    Ok(entries)
}

fn copy_file(src_path: &Path, dst_path: &Path) -> Result<bool, Error> {
    let src_meta = std::fs::metadata(src_path)
        .map_err(|e| Error::io(format!("failed to stat {src_path:?}"), e))?;

    if let Ok(dst_meta) = std::fs::symlink_metadata(dst_path) {
        if dst_meta.len() == src_meta.len()
            && dst_meta.permissions() == src_meta.permissions()
            && same_contents(src_path, dst_path)?
        {
            return Ok(false);
        }
    }

    std::fs::copy(src_path, dst_path)
        .map_err(|e| Error::io(format!("failed to copy {src_path:?} to {dst_path:?}"), e))?;
    Ok(true)
}

fn same_contents(a: &Path, b: &Path) -> Result<bool, Error> {
    let a_data = std::fs::read(a).map_err(|e| Error::io(format!("failed to read {a:?}"), e))?;
    let b_data = std::fs::read(b).map_err(|e| Error::io(format!("failed to read {b:?}"), e))?;
    Ok(a_data == b_data)
}

fn copy_symlink(src_path: &Path, dst_path: &Path) -> Result<bool, Error> {
    let target = std::fs::read_link(src_path)
        .map_err(|e| Error::io(format!("failed to read link {src_path:?}"), e))?;

    match std::fs::read_link(dst_path) {
        Ok(dst_target) if dst_target == target => return Ok(false),
        Ok(_) => {
            std::fs::remove_file(dst_path)
                .map_err(|e| Error::io(format!("failed to remove {dst_path:?}"), e))?;
        }
        Err(_) => {}
    }

    make_symlink(&target, dst_path)
        .map_err(|e| Error::io(format!("failed to create link {dst_path:?}"), e))?;
    Ok(true)
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn make_symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
