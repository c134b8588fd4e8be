//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod check;
pub(crate) mod deploy;
pub(crate) mod serve;
pub(crate) mod upload;

use std::path::Path;

use snatic_config::ProjectLayout;

pub(crate) use build::BuildArgs;
pub(crate) use deploy::DeployArgs;
pub(crate) use serve::ServeArgs;

use crate::error::CliError;

/// Project at `root`, or the nearest one above the working directory.
pub(crate) fn resolve_layout(root: Option<&Path>) -> Result<ProjectLayout, CliError> {
    if let Some(root) = root {
        return Ok(ProjectLayout::new(root));
    }
    let cwd = std::env::current_dir()?;
    ProjectLayout::discover(&cwd).ok_or(CliError::ProjectNotFound(cwd))
}
