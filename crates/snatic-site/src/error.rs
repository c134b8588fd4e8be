use std::io;
use std::path::PathBuf;

use snatic_config::ConfigError;

/// Error returned by the build pipeline.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A template is missing or failed to render.
    #[error("Template '{name}' failed: {source}")]
    Template {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// A markdown source named by a page does not exist.
    #[error("Content file not found: {}", .0.display())]
    MissingContent(PathBuf),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
