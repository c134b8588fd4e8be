//! Remote mirror upload for snatic.
//!
//! Replaces the contents of a remote directory with the local output tree:
//! the remote root is wiped, then the build output is uploaded into it.
//!
//! # Example
//!
//! ```ignore
//! use snatic_config::ProjectLayout;
//! use snatic_deploy::MirrorUploader;
//!
//! let layout = ProjectLayout::new("my-site");
//! let report = MirrorUploader::sftp().upload(&layout)?;
//! println!("{} files uploaded", report.files);
//! ```

mod mirror;
mod uploader;

use std::io;
use std::path::PathBuf;

use snatic_config::ConfigError;
use snatic_storage::StorageError;

pub use mirror::{MirrorOptions, UploadReport, ensure_dir, upload_tree, wipe};
pub use uploader::{Connector, MirrorUploader, SftpConnector};

/// Error returned by the uploader.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The output directory does not exist; build the site first.
    #[error("Site not built: {} does not exist", .0.display())]
    SiteNotBuilt(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to read {}: {source}", .path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
