//! CLI error types.

use std::path::PathBuf;
use std::process::ExitStatus;

use snatic_config::ConfigError;
use snatic_deploy::UploadError;
use snatic_site::BuildError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Upload(#[from] UploadError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("No snatic project found in {} or its parents (missing data/site.yaml)", .0.display())]
    ProjectNotFound(PathBuf),

    /// An external tool could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited unsuccessfully.
    #[error("{program} exited with {status}{}", format_details(.details))]
    Command {
        program: &'static str,
        status: ExitStatus,
        details: String,
    },

    #[error("{0}")]
    Requirement(String),
}

fn format_details(details: &str) -> String {
    let details = details.trim();
    if details.is_empty() {
        String::new()
    } else {
        format!(":\n{details}")
    }
}
