//! Configuration management for snatic.
//!
//! Parses the YAML configuration files of a snatic project with serde and
//! turns them into validated, immutable values:
//!
//! - [`SiteConfig`] from `data/site.yaml` (pages, site metadata, menu)
//! - [`UploadConfig`] from `data/upload.yaml` (SFTP mirror target)
//!
//! All paths are resolved through a [`ProjectLayout`] rooted at an explicit
//! directory, so nothing here depends on the process working directory.
//!
//! ## Environment Variable Expansion
//!
//! String values of the upload configuration support environment variable
//! expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! A `$` outside such a reference is kept literally.

mod layout;
mod site;
mod upload;

use std::path::PathBuf;

pub use layout::ProjectLayout;
pub use site::{
    CategoryFilter, MenuEntrySpec, PageKind, PageSpec, RawMenuEntry, RawPage, RawSiteConfig,
    RawSiteSection, SiteConfig, validate,
};
pub use upload::UploadConfig;

/// Configuration error.
///
/// Validation is fail-fast: the first violation found is the one reported.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// The file parsed to an empty document.
    #[error("Invalid configuration: {} is empty", .0.display())]
    Empty(PathBuf),
    /// `site_config.name` is missing.
    #[error("Name not defined in configuration")]
    MissingSiteName,
    /// No page keyed `home`.
    #[error("Home not defined in configuration")]
    MissingHome,
    /// No `site_config` section.
    #[error("Site configuration not defined")]
    MissingSiteConfig,
    /// `site_config.theme` is missing.
    #[error("Theme not defined in site configuration")]
    MissingTheme,
    /// The theme directory does not exist.
    #[error("Theme {name} not found (looked in {})", .path.display())]
    ThemeNotFound {
        /// Theme name from the configuration.
        name: String,
        /// Directory that was expected to hold the theme.
        path: PathBuf,
    },
    /// A page declares a type other than `page` or `archive`.
    #[error("Page {page}: unknown page type '{kind}'")]
    InvalidPageType {
        /// Page key.
        page: String,
        /// Type as authored.
        kind: String,
    },
    /// A page lacks a field its type requires.
    #[error("Page {page}: '{field}' not defined")]
    MissingPageField {
        /// Page key.
        page: String,
        /// Missing field name.
        field: &'static str,
    },
    /// Two pages would be written to the same output file.
    #[error("Pages {first} and {second} share the slug '{slug}'")]
    DuplicateSlug {
        /// Page declared first.
        first: String,
        /// Page declared second.
        second: String,
        /// Shared slug.
        slug: String,
    },
    /// A menu entry lacks a required field.
    #[error("Menu item {item}: '{field}' not defined")]
    MissingMenuField {
        /// Menu item id.
        item: String,
        /// Missing field name.
        field: &'static str,
    },
    /// A menu entry points at a page that does not exist.
    #[error("Menu item {item}: page '{page}' does not exist")]
    UnknownMenuTarget {
        /// Menu item id.
        item: String,
        /// Referenced page id.
        page: String,
    },
    /// `site_config.dt_format` is not a valid strftime format.
    #[error("Invalid date format '{0}'")]
    InvalidDateFormat(String),
    /// A required upload field is missing.
    #[error("{} not found in upload configuration", capitalize(.field))]
    MissingUploadField {
        /// Missing field name (`host`, `port`, `path`, `user` or `password`).
        field: &'static str,
    },
    /// Any other invalid value.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`upload.password`").
        field: String,
        /// Error message (e.g., "${`SFTP_PASSWORD`} not set").
        message: String,
    },
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Require a string field to be present and non-empty.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_upload_field_message_names_field() {
        let err = ConfigError::MissingUploadField { field: "password" };
        assert_eq!(err.to_string(), "Password not found in upload configuration");
    }

    #[test]
    fn test_non_empty_trims() {
        assert_eq!(non_empty(Some(&"  ".to_owned())), None);
        assert_eq!(non_empty(Some(&" a ".to_owned())), Some("a"));
        assert_eq!(non_empty(None), None);
    }
}
