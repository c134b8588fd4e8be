//! Mock remote store for testing.
//!
//! Provides [`MockRemote`], an in-memory directory tree that enforces the
//! same rules a real server does (parents must exist, directories must be
//! empty before removal) and records every mutation in order.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::sync::RwLock;

use crate::remote::{EntryKind, RemoteEntry, RemoteStore};
use crate::storage::{StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

/// A mutation applied to a [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOp {
    RemoveFile(String),
    RemoveDir(String),
    CreateDir(String),
    WriteFile(String),
}

/// In-memory remote store.
///
/// # Example
///
/// ```ignore
/// use snatic_storage::{MockRemote, RemoteStore};
///
/// let remote = MockRemote::new()
///     .with_dir("/srv/www/old")
///     .with_file("/srv/www/old/page.html", "stale");
///
/// let entries = remote.list_dir("/srv/www").unwrap();
/// ```
#[derive(Debug)]
pub struct MockRemote {
    dirs: RwLock<BTreeSet<String>>,
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    links: RwLock<BTreeSet<String>>,
    ops: RwLock<Vec<RemoteOp>>,
    fail_on_write: RwLock<Option<String>>,
}

impl Default for MockRemote {
    fn default() -> Self {
        Self {
            dirs: RwLock::new(BTreeSet::from(["/".to_owned()])),
            files: RwLock::new(BTreeMap::new()),
            links: RwLock::new(BTreeSet::new()),
            ops: RwLock::new(Vec::new()),
            fail_on_write: RwLock::new(None),
        }
    }
}

impl MockRemote {
    /// Create a store holding only the root directory `/`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and all of its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        self.insert_dir_all(&normalize(path));
        self
    }

    /// Add a file, creating its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        let path = normalize(path);
        self.insert_dir_all(parent_of(&path));
        self.files.write().unwrap().insert(path, content.into());
        self
    }

    /// Add a symlink (an entry that is neither file nor directory).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_link(self, path: &str) -> Self {
        let path = normalize(path);
        self.insert_dir_all(parent_of(&path));
        self.links.write().unwrap().insert(path);
        self
    }

    /// Make the write of `path` fail with a permission error.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn failing_write(self, path: &str) -> Self {
        *self.fail_on_write.write().unwrap() = Some(normalize(path));
        self
    }

    /// Content of the file at `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(&normalize(path)).cloned()
    }

    /// Whether a directory exists at `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn has_dir(&self, path: &str) -> bool {
        self.dirs.read().unwrap().contains(&normalize(path))
    }

    /// Every entry below `root`, as paths relative to it.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn entries_under(&self, root: &str) -> BTreeSet<String> {
        let root = normalize(root);
        let prefix = if root == "/" {
            root.clone()
        } else {
            format!("{root}/")
        };
        let dirs = self.dirs.read().unwrap();
        let files = self.files.read().unwrap();
        let links = self.links.read().unwrap();
        dirs.iter()
            .chain(files.keys())
            .chain(links.iter())
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter(|p| !p.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Mutations applied so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn operations(&self) -> Vec<RemoteOp> {
        self.ops.read().unwrap().clone()
    }

    fn insert_dir_all(&self, path: &str) {
        let mut dirs = self.dirs.write().unwrap();
        let mut current = path;
        while !dirs.contains(current) {
            dirs.insert(current.to_owned());
            current = parent_of(current);
        }
    }

    fn record(&self, op: RemoteOp) {
        self.ops.write().unwrap().push(op);
    }

    fn has_children(&self, path: &str) -> bool {
        let prefix = if path == "/" {
            path.to_owned()
        } else {
            format!("{path}/")
        };
        let child = |p: &String| p != path && p.starts_with(&prefix);
        self.dirs.read().unwrap().iter().any(child)
            || self.files.read().unwrap().keys().any(child)
            || self.links.read().unwrap().iter().any(child)
    }

    fn error(kind: StorageErrorKind, path: &str) -> StorageError {
        StorageError::new(kind)
            .with_path(path)
            .with_backend(BACKEND)
    }
}

impl RemoteStore for MockRemote {
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, StorageError> {
        let path = normalize(path);
        if !self.has_dir(&path) {
            return Err(Self::error(StorageErrorKind::NotFound, &path));
        }
        let is_child = |p: &String| p != &path && parent_of(p) == path;

        let mut entries: Vec<RemoteEntry> = Vec::new();
        for dir in self.dirs.read().unwrap().iter().filter(|p| is_child(p)) {
            entries.push(RemoteEntry::new(name_of(dir), EntryKind::Dir));
        }
        for file in self.files.read().unwrap().keys().filter(|p| is_child(p)) {
            entries.push(RemoteEntry::new(name_of(file), EntryKind::File));
        }
        for link in self.links.read().unwrap().iter().filter(|p| is_child(p)) {
            entries.push(RemoteEntry::new(name_of(link), EntryKind::Other));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn remove_file(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path);
        let removed = self.files.write().unwrap().remove(&path).is_some()
            || self.links.write().unwrap().remove(&path);
        if !removed {
            return Err(Self::error(StorageErrorKind::NotFound, &path));
        }
        self.record(RemoteOp::RemoveFile(path));
        Ok(())
    }

    fn remove_dir(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path);
        if !self.has_dir(&path) {
            return Err(Self::error(StorageErrorKind::NotFound, &path));
        }
        if self.has_children(&path) {
            return Err(Self::error(StorageErrorKind::NotEmpty, &path));
        }
        self.dirs.write().unwrap().remove(&path);
        self.record(RemoteOp::RemoveDir(path));
        Ok(())
    }

    fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        let path = normalize(path);
        if self.has_dir(&path) || self.files.read().unwrap().contains_key(&path) {
            return Err(Self::error(StorageErrorKind::AlreadyExists, &path));
        }
        if !self.has_dir(parent_of(&path)) {
            return Err(Self::error(StorageErrorKind::NotFound, parent_of(&path)));
        }
        self.dirs.write().unwrap().insert(path.clone());
        self.record(RemoteOp::CreateDir(path));
        Ok(())
    }

    fn write_file(&self, path: &str, contents: &mut dyn Read) -> Result<u64, StorageError> {
        let path = normalize(path);
        if self.fail_on_write.read().unwrap().as_deref() == Some(path.as_str()) {
            return Err(Self::error(StorageErrorKind::PermissionDenied, &path));
        }
        if !self.has_dir(parent_of(&path)) {
            return Err(Self::error(StorageErrorKind::NotFound, parent_of(&path)));
        }
        if self.has_dir(&path) {
            return Err(Self::error(StorageErrorKind::InvalidPath, &path));
        }
        let mut buf = Vec::new();
        contents
            .read_to_end(&mut buf)
            .map_err(|e| StorageError::io(e, Some(path.clone().into())).with_backend(BACKEND))?;
        let written = buf.len() as u64;
        self.files.write().unwrap().insert(path.clone(), buf);
        self.record(RemoteOp::WriteFile(path));
        Ok(written)
    }
}

/// Strip trailing slashes; the root stays `/`.
fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
