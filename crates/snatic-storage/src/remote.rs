//! Remote directory capability.

use std::io::Read;

use crate::StorageError;

/// Type of a remote directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, sockets and anything else that is neither.
    Other,
}

/// One entry returned by [`RemoteStore::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Entry name (no directory component).
    pub name: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Directory operations a mirror needs from a remote file store.
///
/// All paths are POSIX paths on the remote side. Implementations own their
/// connection; dropping the store releases it.
pub trait RemoteStore {
    /// List the entries of a directory, excluding `.` and `..`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] with kind `NotFound` if the directory does not exist.
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, StorageError>;

    /// Remove a file (or any non-directory entry).
    fn remove_file(&self, path: &str) -> Result<(), StorageError>;

    /// Remove an empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] with kind `NotEmpty` if the directory still has entries.
    fn remove_dir(&self, path: &str) -> Result<(), StorageError>;

    /// Create a directory whose parent exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] with kind `AlreadyExists` if the directory exists.
    fn create_dir(&self, path: &str) -> Result<(), StorageError>;

    /// Create or truncate a file and fill it from `contents`.
    ///
    /// Returns the number of bytes written.
    fn write_file(&self, path: &str, contents: &mut dyn Read) -> Result<u64, StorageError>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for &T {
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, StorageError> {
        (**self).list_dir(path)
    }

    fn remove_file(&self, path: &str) -> Result<(), StorageError> {
        (**self).remove_file(path)
    }

    fn remove_dir(&self, path: &str) -> Result<(), StorageError> {
        (**self).remove_dir(path)
    }

    fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        (**self).create_dir(path)
    }

    fn write_file(&self, path: &str, contents: &mut dyn Read) -> Result<u64, StorageError> {
        (**self).write_file(path, contents)
    }
}

/// Join a remote directory and an entry name with exactly one `/`.
#[must_use]
pub fn join(base: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if base.is_empty() {
        name.to_owned()
    } else if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join("/srv/www", "index.php"), "/srv/www/index.php");
        assert_eq!(join("/srv/www/", "html"), "/srv/www/html");
        assert_eq!(join("/", "html"), "/html");
        assert_eq!(join("", "html"), "html");
        assert_eq!(join("/srv", "/html"), "/srv/html");
    }
}
