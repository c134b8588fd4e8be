//! `snatic check` command implementation.

use crate::error::CliError;
use crate::output::Output;
use crate::php::{self, MIN_COMPOSER_MAJOR, MIN_PHP_MAJOR, Version};

/// Verify the PHP toolchain needed to build and serve a site.
pub(crate) fn execute() -> Result<(), CliError> {
    let output = Output::new();
    output.step("Checking requisites...");

    let php = php::php_version().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "php --version failed");
        None
    });
    require(&output, "PHP", php, MIN_PHP_MAJOR)?;

    let composer = php::composer_version().unwrap_or_else(|err| {
        tracing::debug!(error = %err, "composer -V failed");
        None
    });
    require(&output, "Composer", composer, MIN_COMPOSER_MAJOR)?;

    Ok(())
}

fn require(
    output: &Output,
    tool: &str,
    found: Option<Version>,
    min_major: u32,
) -> Result<(), CliError> {
    match found {
        Some(version) if version.major >= min_major => {
            output.success(&format!("{tool} {version} found (>= {min_major}.0)"));
            Ok(())
        }
        Some(version) => Err(CliError::Requirement(format!(
            "{tool} {version} found, version >= {min_major}.0 required"
        ))),
        None => Err(CliError::Requirement(format!(
            "{tool} not on PATH or not installed"
        ))),
    }
}
