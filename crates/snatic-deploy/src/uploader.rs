//! Mirror upload orchestration.

use std::path::Path;

use snatic_config::{ProjectLayout, UploadConfig};
use snatic_storage::{RemoteStore, StorageError};
use snatic_storage_sftp::SftpStore;

use crate::UploadError;
use crate::mirror::{MirrorOptions, UploadReport, upload_tree, wipe};

/// Opens a [`RemoteStore`] session for an upload target.
pub trait Connector {
    type Store: RemoteStore;

    /// Connect and authenticate.
    fn connect(&self, target: &UploadConfig) -> Result<Self::Store, StorageError>;
}

/// Connects over SFTP with password authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct SftpConnector;

impl Connector for SftpConnector {
    type Store = SftpStore;

    fn connect(&self, target: &UploadConfig) -> Result<SftpStore, StorageError> {
        SftpStore::connect(target)
    }
}

/// Mirrors a built site onto a remote directory.
pub struct MirrorUploader<C> {
    connector: C,
}

impl MirrorUploader<SftpConnector> {
    /// Uploader for the SFTP target described by `upload.yaml`.
    #[must_use]
    pub fn sftp() -> Self {
        Self::new(SftpConnector)
    }
}

impl<C: Connector> MirrorUploader<C> {
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Mirror the project's output directory to its configured target.
    ///
    /// Nothing is contacted until the output exists and the upload
    /// configuration is valid.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::SiteNotBuilt`] if the site was never built,
    /// [`UploadError::Config`] if `upload.yaml` is missing or incomplete,
    /// and [`UploadError::Storage`] for any remote failure.
    pub fn upload(&self, layout: &ProjectLayout) -> Result<UploadReport, UploadError> {
        let output_dir = layout.output_dir();
        if !output_dir.is_dir() {
            return Err(UploadError::SiteNotBuilt(output_dir));
        }
        let target = UploadConfig::load(&layout.upload_config_file())?;
        self.upload_to(&output_dir, &target)
    }

    /// Mirror `local_root` to `target`.
    ///
    /// The session is closed when this returns, on success and failure alike.
    pub fn upload_to(
        &self,
        local_root: &Path,
        target: &UploadConfig,
    ) -> Result<UploadReport, UploadError> {
        if !local_root.is_dir() {
            return Err(UploadError::SiteNotBuilt(local_root.to_path_buf()));
        }

        let store = self.connector.connect(target)?;
        let removed = wipe(&store, &target.remote_path)?;
        tracing::info!(removed, path = %target.remote_path, "Remote directory cleared");

        let options = MirrorOptions {
            rewrite_rules_filename: ProjectLayout::rewrite_rules_filename().to_owned(),
            upload_rewrite_rules: target.upload_rewrite_rules,
        };
        let mut report = upload_tree(&store, local_root, &target.remote_path, &options)?;
        report.removed = removed;

        tracing::info!(
            files = report.files,
            directories = report.directories,
            bytes = report.bytes,
            "Upload complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::fs;

    use pretty_assertions::assert_eq;
    use snatic_config::ConfigError;
    use snatic_storage::{MockRemote, StorageErrorKind};

    use super::*;

    struct MockConnector<'a> {
        remote: &'a MockRemote,
        attempts: Cell<usize>,
        refuse: bool,
    }

    impl<'a> MockConnector<'a> {
        fn new(remote: &'a MockRemote) -> Self {
            Self {
                remote,
                attempts: Cell::new(0),
                refuse: false,
            }
        }
    }

    impl<'a> Connector for &MockConnector<'a> {
        type Store = &'a MockRemote;

        fn connect(&self, _target: &UploadConfig) -> Result<Self::Store, StorageError> {
            self.attempts.set(self.attempts.get() + 1);
            if self.refuse {
                return Err(StorageError::new(StorageErrorKind::AuthenticationFailed));
            }
            Ok(self.remote)
        }
    }

    fn target(upload_rewrite_rules: bool) -> UploadConfig {
        UploadConfig {
            host: "example.org".to_owned(),
            port: 22,
            remote_path: "/www".to_owned(),
            user: "deploy".to_owned(),
            password: "secret".to_owned(),
            upload_rewrite_rules,
        }
    }

    fn built_project() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let site = temp_dir.path().join("site");
        fs::create_dir_all(site.join("html")).unwrap();
        fs::create_dir_all(site.join("assets/img")).unwrap();
        fs::write(site.join("html/index.html"), "<h1>Home</h1>").unwrap();
        fs::write(site.join("assets/img/logo.svg"), "<svg/>").unwrap();
        fs::write(site.join("index.php"), "<?php").unwrap();
        fs::write(site.join(".htaccess"), "RewriteEngine On").unwrap();
        temp_dir
    }

    #[test]
    fn test_upload_replaces_remote_contents() {
        let project = built_project();
        let remote = MockRemote::new()
            .with_file("/www/old/stale.html", "stale")
            .with_file("/www/index.php", "old");
        let connector = MockConnector::new(&remote);

        let report = MirrorUploader::new(&connector)
            .upload_to(&project.path().join("site"), &target(false))
            .unwrap();

        assert_eq!(connector.attempts.get(), 1);
        assert_eq!(report.removed, 3);
        assert_eq!(report.files, 3);
        let expected: BTreeSet<String> = [
            "assets",
            "assets/img",
            "assets/img/logo.svg",
            "html",
            "html/index.html",
            "index.php",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect();
        assert_eq!(remote.entries_under("/www"), expected);
        assert_eq!(remote.file("/www/index.php"), Some(b"<?php".to_vec()));
    }

    #[test]
    fn test_upload_includes_rewrite_rules_when_enabled() {
        let project = built_project();
        let remote = MockRemote::new().with_dir("/www");
        let connector = MockConnector::new(&remote);

        MirrorUploader::new(&connector)
            .upload_to(&project.path().join("site"), &target(true))
            .unwrap();

        assert_eq!(
            remote.file("/www/.htaccess"),
            Some(b"RewriteEngine On".to_vec())
        );
    }

    #[test]
    fn test_upload_without_build_never_connects() {
        let project = tempfile::tempdir().unwrap();
        let remote = MockRemote::new();
        let connector = MockConnector::new(&remote);

        let err = MirrorUploader::new(&connector)
            .upload(&ProjectLayout::new(project.path()))
            .unwrap_err();

        assert!(matches!(err, UploadError::SiteNotBuilt(_)), "got {err:?}");
        assert_eq!(connector.attempts.get(), 0);
    }

    #[test]
    fn test_upload_with_missing_password_never_connects() {
        let project = built_project();
        fs::create_dir_all(project.path().join("data")).unwrap();
        fs::write(
            project.path().join("data/upload.yaml"),
            "upload:\n  host: example.org\n  port: 22\n  path: /www\n  user: deploy\n",
        )
        .unwrap();
        let remote = MockRemote::new();
        let connector = MockConnector::new(&remote);

        let err = MirrorUploader::new(&connector)
            .upload(&ProjectLayout::new(project.path()))
            .unwrap_err();

        assert!(
            matches!(
                err,
                UploadError::Config(ConfigError::MissingUploadField { field: "password" })
            ),
            "got {err:?}"
        );
        assert_eq!(
            err.to_string(),
            "Password not found in upload configuration"
        );
        assert_eq!(connector.attempts.get(), 0);
    }

    #[test]
    fn test_upload_with_missing_config_file() {
        let project = built_project();
        let remote = MockRemote::new();
        let connector = MockConnector::new(&remote);

        let err = MirrorUploader::new(&connector)
            .upload(&ProjectLayout::new(project.path()))
            .unwrap_err();

        assert!(
            matches!(err, UploadError::Config(ConfigError::NotFound(_))),
            "got {err:?}"
        );
        assert_eq!(connector.attempts.get(), 0);
    }

    #[test]
    fn test_refused_connection_leaves_remote_untouched() {
        let project = built_project();
        let remote = MockRemote::new().with_file("/www/index.php", "old");
        let connector = MockConnector {
            refuse: true,
            ..MockConnector::new(&remote)
        };

        let err = MirrorUploader::new(&connector)
            .upload_to(&project.path().join("site"), &target(false))
            .unwrap_err();

        assert!(matches!(err, UploadError::Storage(_)), "got {err:?}");
        assert!(remote.operations().is_empty());
    }
}
