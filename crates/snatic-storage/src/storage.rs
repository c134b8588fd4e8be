//! Storage error types.
//!
//! Provides [`StorageError`] for unified error handling across remote
//! backends, with a semantic [`StorageErrorKind`] so callers can react to
//! conditions like "already exists" without knowing the transport.

use std::path::PathBuf;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Resource already exists (for create operations).
    AlreadyExists,
    /// Directory still has entries.
    NotEmpty,
    /// Invalid path or identifier.
    InvalidPath,
    /// Could not reach the remote host.
    Unavailable,
    /// The remote host rejected the credentials.
    AuthenticationFailed,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    kind: StorageErrorKind,
    path: Option<PathBuf>,
    backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Semantic error category.
    #[must_use]
    pub fn kind(&self) -> StorageErrorKind {
        self.kind
    }

    /// Path the error refers to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    /// Backend identifier (e.g., "Sftp", "Mock").
    #[must_use]
    pub fn backend(&self) -> Option<&'static str> {
        self.backend
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::AlreadyExists => StorageErrorKind::AlreadyExists,
            std::io::ErrorKind::DirectoryNotEmpty => StorageErrorKind::NotEmpty,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::HostUnreachable
            | std::io::ErrorKind::NetworkUnreachable => StorageErrorKind::Unavailable,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::AlreadyExists => "Already exists",
            StorageErrorKind::NotEmpty => "Directory not empty",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::AuthenticationFailed => "Authentication failed",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::Path;

    use super::*;

    #[test]
    fn test_display_full() {
        let err = StorageError::new(StorageErrorKind::NotFound)
            .with_backend("Sftp")
            .with_path("/srv/www/index.php");
        assert_eq!(
            err.to_string(),
            "[Sftp] Not found (path: /srv/www/index.php)"
        );
    }

    #[test]
    fn test_display_with_source() {
        let io = std::io::Error::other("disk on fire");
        let err = StorageError::new(StorageErrorKind::Other).with_source(io);
        assert_eq!(err.to_string(), "Error: disk on fire");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_conversion_maps_kind() {
        let err = StorageError::io(
            std::io::Error::from(std::io::ErrorKind::NotFound),
            Some(PathBuf::from("/a")),
        );
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.path(), Some(Path::new("/a")));

        let err = StorageError::io(
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            None,
        );
        assert_eq!(err.kind(), StorageErrorKind::Unavailable);
        assert!(err.path().is_none());
    }
}
