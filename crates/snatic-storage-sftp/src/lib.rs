//! SFTP backend for snatic remote stores.
//!
//! [`SftpStore`] owns one SSH session and its SFTP channel. The session is
//! opened and authenticated by [`SftpStore::connect`] and disconnected when
//! the store is dropped, so every exit path of a deployment releases it.

use std::io::Read;
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use snatic_config::UploadConfig;
use snatic_storage::{EntryKind, RemoteEntry, RemoteStore, StorageError, StorageErrorKind};
use ssh2::{ErrorCode, Session, Sftp};

const BACKEND: &str = "Sftp";
const SESSION_TIMEOUT: Duration = Duration::from_secs(30);
const DIR_MODE: i32 = 0o755;

// libssh2 status codes (libssh2.h / libssh2_sftp.h)
const FX_NO_SUCH_FILE: i32 = 2;
const FX_PERMISSION_DENIED: i32 = 3;
const FX_NO_SUCH_PATH: i32 = 10;
const FX_FILE_ALREADY_EXISTS: i32 = 11;
const FX_DIR_NOT_EMPTY: i32 = 18;
const ERROR_TIMEOUT: i32 = -9;
const ERROR_AUTHENTICATION_FAILED: i32 = -18;

/// Remote store backed by an authenticated SFTP session.
pub struct SftpStore {
    sftp: Sftp,
    session: Session,
    address: String,
}

impl SftpStore {
    /// Open a session to the upload target and authenticate with its password.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the host cannot be reached and
    /// `AuthenticationFailed` if the credentials are rejected.
    pub fn connect(target: &UploadConfig) -> Result<Self, StorageError> {
        let address = target.address();
        tracing::info!(address = %address, user = %target.user, "Connecting to SFTP");

        let tcp = TcpStream::connect((target.host.as_str(), target.port))
            .map_err(|e| StorageError::io(e, None).with_backend(BACKEND))?;

        let mut session = Session::new().map_err(|e| map_ssh_error(e, None))?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(SESSION_TIMEOUT.as_millis()).unwrap_or(u32::MAX));
        session.handshake().map_err(|e| map_ssh_error(e, None))?;
        session
            .userauth_password(&target.user, &target.password)
            .map_err(|e| map_ssh_error(e, None))?;
        if !session.authenticated() {
            return Err(StorageError::new(StorageErrorKind::AuthenticationFailed)
                .with_backend(BACKEND));
        }

        let sftp = session.sftp().map_err(|e| map_ssh_error(e, None))?;
        tracing::info!(address = %address, "Connected");
        Ok(Self {
            sftp,
            session,
            address,
        })
    }
}

impl Drop for SftpStore {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "snatic upload finished", None) {
            tracing::debug!(address = %self.address, error = %e, "SFTP disconnect failed");
        } else {
            tracing::debug!(address = %self.address, "SFTP session closed");
        }
    }
}

impl RemoteStore for SftpStore {
    fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>, StorageError> {
        let listing = self
            .sftp
            .readdir(Path::new(path))
            .map_err(|e| map_ssh_error(e, Some(path)))?;

        let mut entries: Vec<RemoteEntry> = listing
            .into_iter()
            .filter_map(|(entry_path, stat)| {
                let name = entry_path.file_name()?.to_string_lossy().into_owned();
                if name == "." || name == ".." {
                    return None;
                }
                let kind = if stat.is_dir() {
                    EntryKind::Dir
                } else if stat.is_file() {
                    EntryKind::File
                } else {
                    EntryKind::Other
                };
                Some(RemoteEntry::new(name, kind))
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn remove_file(&self, path: &str) -> Result<(), StorageError> {
        self.sftp
            .unlink(Path::new(path))
            .map_err(|e| map_ssh_error(e, Some(path)))
    }

    fn remove_dir(&self, path: &str) -> Result<(), StorageError> {
        self.sftp
            .rmdir(Path::new(path))
            .map_err(|e| map_ssh_error(e, Some(path)))
    }

    fn create_dir(&self, path: &str) -> Result<(), StorageError> {
        match self.sftp.mkdir(Path::new(path), DIR_MODE) {
            Ok(()) => Ok(()),
            Err(e) => {
                // OpenSSH answers a generic failure for existing directories.
                let exists = self
                    .sftp
                    .lstat(Path::new(path))
                    .is_ok_and(|stat| stat.is_dir());
                if exists {
                    Err(StorageError::new(StorageErrorKind::AlreadyExists)
                        .with_path(path)
                        .with_backend(BACKEND))
                } else {
                    Err(map_ssh_error(e, Some(path)))
                }
            }
        }
    }

    fn write_file(&self, path: &str, contents: &mut dyn Read) -> Result<u64, StorageError> {
        let mut file = self
            .sftp
            .create(Path::new(path))
            .map_err(|e| map_ssh_error(e, Some(path)))?;
        std::io::copy(contents, &mut file)
            .map_err(|e| StorageError::io(e, Some(path.into())).with_backend(BACKEND))
    }
}

/// Translate a libssh2 error into a [`StorageError`].
fn map_ssh_error(err: ssh2::Error, path: Option<&str>) -> StorageError {
    let kind = match err.code() {
        ErrorCode::SFTP(FX_NO_SUCH_FILE | FX_NO_SUCH_PATH) => StorageErrorKind::NotFound,
        ErrorCode::SFTP(FX_PERMISSION_DENIED) => StorageErrorKind::PermissionDenied,
        ErrorCode::SFTP(FX_FILE_ALREADY_EXISTS) => StorageErrorKind::AlreadyExists,
        ErrorCode::SFTP(FX_DIR_NOT_EMPTY) => StorageErrorKind::NotEmpty,
        ErrorCode::Session(ERROR_TIMEOUT) => StorageErrorKind::Timeout,
        ErrorCode::Session(ERROR_AUTHENTICATION_FAILED) => StorageErrorKind::AuthenticationFailed,
        _ => StorageErrorKind::Other,
    };
    let mut error = StorageError::new(kind)
        .with_backend(BACKEND)
        .with_source(err);
    if let Some(p) = path {
        error = error.with_path(p);
    }
    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sftp_status_codes_map_to_kinds() {
        let err = map_ssh_error(
            ssh2::Error::new(ErrorCode::SFTP(FX_NO_SUCH_FILE), "no such file"),
            Some("/srv/www"),
        );
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert_eq!(err.backend(), Some("Sftp"));
        assert_eq!(err.path(), Some(Path::new("/srv/www")));

        let err = map_ssh_error(
            ssh2::Error::new(ErrorCode::SFTP(FX_DIR_NOT_EMPTY), "not empty"),
            None,
        );
        assert_eq!(err.kind(), StorageErrorKind::NotEmpty);
    }

    #[test]
    fn test_auth_failure_maps_to_kind() {
        let err = map_ssh_error(
            ssh2::Error::new(
                ErrorCode::Session(ERROR_AUTHENTICATION_FAILED),
                "bad password",
            ),
            None,
        );
        assert_eq!(err.kind(), StorageErrorKind::AuthenticationFailed);
        assert!(err.to_string().contains("bad password"));
    }
}
