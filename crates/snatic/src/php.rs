//! PHP toolchain used by the generated front controller.
//!
//! Every command receives its working directory explicitly; the process
//! working directory is never changed.

use std::path::Path;
use std::process::{Command, Output as ProcessOutput};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CliError;

const PHP: &str = "php";
const COMPOSER: &str = "composer";
/// Package providing the routing used by `index.php`.
const FRONT_CONTROLLER_PACKAGE: &str = "bcosca/fatfree";

pub(crate) const MIN_PHP_MAJOR: u32 = 7;
pub(crate) const MIN_COMPOSER_MAJOR: u32 = 2;

static PHP_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bPHP (\d+)\.(\d+)(?:\.(\d+))?").unwrap());

static COMPOSER_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bComposer (?:version )?(\d+)\.(\d+)(?:\.(\d+))?").unwrap());

/// A `major.minor` tool version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Version {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn parse_version(re: &Regex, text: &str) -> Option<Version> {
    let caps = re.captures(text)?;
    Some(Version {
        major: caps[1].parse().ok()?,
        minor: caps[2].parse().ok()?,
    })
}

/// Version reported by `php --version`.
pub(crate) fn parse_php_version(text: &str) -> Option<Version> {
    parse_version(&PHP_VERSION_RE, text)
}

/// Version reported by `composer -V`.
pub(crate) fn parse_composer_version(text: &str) -> Option<Version> {
    parse_version(&COMPOSER_VERSION_RE, text)
}

/// Installed PHP version.
pub(crate) fn php_version() -> Result<Option<Version>, CliError> {
    let output = capture(PHP, &["--version"], None)?;
    Ok(parse_php_version(&String::from_utf8_lossy(&output.stdout)))
}

/// Installed Composer version.
pub(crate) fn composer_version() -> Result<Option<Version>, CliError> {
    let output = capture(COMPOSER, &["-V"], None)?;
    Ok(parse_composer_version(&String::from_utf8_lossy(&output.stdout)))
}

/// Install the front controller's dependency into `output_dir`.
pub(crate) fn install_front_controller(output_dir: &Path) -> Result<(), CliError> {
    tracing::info!(dir = %output_dir.display(), package = FRONT_CONTROLLER_PACKAGE, "composer require");
    let output = capture(
        COMPOSER,
        &["require", FRONT_CONTROLLER_PACKAGE],
        Some(output_dir),
    )?;
    if !output.status.success() {
        return Err(CliError::Command {
            program: COMPOSER,
            status: output.status,
            details: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Run PHP's built-in web server on `document_root` until it exits.
pub(crate) fn serve(address: &str, document_root: &Path) -> Result<(), CliError> {
    let status = Command::new(PHP)
        .arg("-S")
        .arg(address)
        .arg("-t")
        .arg(document_root)
        .status()
        .map_err(|source| CliError::Spawn {
            program: PHP,
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::Command {
            program: PHP,
            status,
            details: String::new(),
        })
    }
}

fn capture(program: &'static str, args: &[&str], dir: Option<&Path>) -> Result<ProcessOutput, CliError> {
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    command
        .output()
        .map_err(|source| CliError::Spawn { program, source })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_php_version() {
        let text = "PHP 8.2.12 (cli) (built: Oct 24 2023 21:15:15) (NTS)\nCopyright (c) The PHP Group";
        assert_eq!(
            parse_php_version(text),
            Some(Version { major: 8, minor: 2 })
        );
        assert_eq!(parse_php_version("command not found"), None);
    }

    #[test]
    fn test_parse_composer_version() {
        assert_eq!(
            parse_composer_version("Composer version 2.6.5 2023-10-06 10:11:52"),
            Some(Version { major: 2, minor: 6 })
        );
        assert_eq!(
            parse_composer_version("Composer 2.7.1 2024-02-09 15:26:28"),
            Some(Version { major: 2, minor: 7 })
        );
    }

    #[test]
    fn test_minimum_versions() {
        let old = parse_php_version("PHP 5.6.40 (cli)").unwrap();
        assert!(old.major < MIN_PHP_MAJOR);
        let old = parse_composer_version("Composer version 1.10.26").unwrap();
        assert!(old.major < MIN_COMPOSER_MAJOR);
        assert_eq!(old.to_string(), "1.10");
    }
}
