//! Mirror algorithms over a [`RemoteStore`].
//!
//! A mirror is two tree walks:
//!
//! 1. [`wipe`] removes everything below the remote root, post-order, so a
//!    directory is only removed once its contents are gone.
//! 2. [`upload_tree`] walks the local output root pre-order, creating each
//!    remote directory before uploading its contents.
//!
//! Neither walk retries or rolls back: the first error stops the mirror and
//! leaves the remote side as it was at that moment.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use snatic_storage::{EntryKind, RemoteEntry, RemoteStore, StorageError, StorageErrorKind, join};

use crate::UploadError;

/// Options for [`upload_tree`].
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    /// Files at the top of the local root that are only uploaded when
    /// `upload_rewrite_rules` is set.
    pub rewrite_rules_filename: String,
    pub upload_rewrite_rules: bool,
}

/// Summary of a finished mirror.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Remote entries removed by the wipe.
    pub removed: usize,
    /// Remote directories created (the root included when it was missing).
    pub directories: usize,
    /// Files uploaded.
    pub files: usize,
    /// Bytes uploaded.
    pub bytes: u64,
    /// Local entries deliberately not uploaded.
    pub skipped: Vec<PathBuf>,
}

/// Recursively delete every entry below `root`, keeping `root` itself.
///
/// A missing `root` is treated as already empty. Returns the number of
/// entries removed.
pub fn wipe(store: &dyn RemoteStore, root: &str) -> Result<usize, StorageError> {
    let entries = match store.list_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == StorageErrorKind::NotFound => {
            tracing::info!(root, "Remote root does not exist, nothing to delete");
            return Ok(0);
        }
        Err(e) => return Err(e),
    };
    let mut removed = 0;
    remove_entries(store, root, entries, &mut removed)?;
    Ok(removed)
}

fn remove_entries(
    store: &dyn RemoteStore,
    dir: &str,
    entries: Vec<RemoteEntry>,
    removed: &mut usize,
) -> Result<(), StorageError> {
    for entry in entries {
        let path = join(dir, &entry.name);
        match entry.kind {
            EntryKind::Dir => {
                let children = store.list_dir(&path)?;
                remove_entries(store, &path, children, removed)?;
                store.remove_dir(&path)?;
            }
            EntryKind::File | EntryKind::Other => store.remove_file(&path)?,
        }
        tracing::debug!(path = %path, "Removed");
        *removed += 1;
    }
    Ok(())
}

/// Create `path` and any missing ancestors, tolerating existing directories.
///
/// Returns the number of directories actually created.
pub fn ensure_dir(store: &dyn RemoteStore, path: &str) -> Result<usize, StorageError> {
    let mut created = 0;
    let mut current = String::new();
    if path.starts_with('/') {
        current.push('/');
    }
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current = join(&current, segment);
        if create_dir_idempotent(store, &current)? {
            created += 1;
        }
    }
    Ok(created)
}

/// Create a directory; `Ok(false)` if it already existed.
fn create_dir_idempotent(store: &dyn RemoteStore, path: &str) -> Result<bool, StorageError> {
    match store.create_dir(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == StorageErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

/// Upload the local tree below `local_root` into `remote_root`.
///
/// `remote_root` is created if missing. Entries are visited in name order.
pub fn upload_tree(
    store: &dyn RemoteStore,
    local_root: &Path,
    remote_root: &str,
    options: &MirrorOptions,
) -> Result<UploadReport, UploadError> {
    let mut report = UploadReport {
        directories: ensure_dir(store, remote_root)?,
        ..UploadReport::default()
    };
    upload_dir(store, local_root, remote_root, true, options, &mut report)?;
    Ok(report)
}

fn upload_dir(
    store: &dyn RemoteStore,
    local_dir: &Path,
    remote_dir: &str,
    is_root: bool,
    options: &MirrorOptions,
    report: &mut UploadReport,
) -> Result<(), UploadError> {
    for (name, local_path) in sorted_entries(local_dir)? {
        let remote_path = join(remote_dir, &name);

        if is_root && name == options.rewrite_rules_filename && !options.upload_rewrite_rules {
            tracing::info!(path = %local_path.display(), "Skipped rewrite rules");
            report.skipped.push(local_path);
            continue;
        }

        // Follows symlinks, like the build's own asset copy.
        let metadata = fs::metadata(&local_path).map_err(|source| UploadError::LocalIo {
            path: local_path.clone(),
            source,
        })?;
        if metadata.is_dir() {
            if create_dir_idempotent(store, &remote_path)? {
                report.directories += 1;
            }
            tracing::debug!(path = %remote_path, "Directory");
            upload_dir(store, &local_path, &remote_path, false, options, report)?;
        } else if metadata.is_file() {
            let mut file = File::open(&local_path).map_err(|source| UploadError::LocalIo {
                path: local_path.clone(),
                source,
            })?;
            let bytes = store.write_file(&remote_path, &mut file)?;
            tracing::debug!(path = %remote_path, bytes, "Uploaded");
            report.files += 1;
            report.bytes += bytes;
        } else {
            tracing::warn!(path = %local_path.display(), "Ignored: neither file nor directory");
            report.skipped.push(local_path);
        }
    }
    Ok(())
}

fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>, UploadError> {
    let io_err = |source| UploadError::LocalIo {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        entries.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}
