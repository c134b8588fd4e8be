//! Upload configuration (`data/upload.yaml`).

use std::env::{self, VarError};
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::site::read_yaml;
use crate::{ConfigError, non_empty};

/// Upload file as authored.
#[derive(Debug, Deserialize)]
struct RawUploadFile {
    upload: Option<RawUpload>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUpload {
    host: Option<Scalar>,
    port: Option<Scalar>,
    path: Option<Scalar>,
    user: Option<Scalar>,
    password: Option<Scalar>,
    upload_htaccess: Option<Scalar>,
}

/// YAML scalar accepted where users write either `22` or `"22"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Str(s) => s,
        }
    }
}

/// Validated SFTP mirror target.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub host: String,
    pub port: u16,
    /// Remote directory mirrored from the output root.
    pub remote_path: String,
    pub user: String,
    pub password: String,
    /// Upload `.htaccess` too (skipped by default).
    pub upload_rewrite_rules: bool,
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("remote_path", &self.remote_path)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("upload_rewrite_rules", &self.upload_rewrite_rules)
            .finish()
    }
}

impl UploadConfig {
    /// Load and validate an upload configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = read_yaml::<RawUploadFile>(path)?;
        Self::from_raw(raw)
    }

    /// Parse and validate upload configuration text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let raw: Option<RawUploadFile> = serde_yaml::from_str(content)?;
        let raw = raw.ok_or_else(|| ConfigError::Validation("upload configuration is empty".to_owned()))?;
        Self::from_raw(raw)
    }

    /// `host:port` for display and connecting.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn from_raw(raw: RawUploadFile) -> Result<Self, ConfigError> {
        let raw = raw
            .upload
            .ok_or_else(|| ConfigError::Validation("upload section not defined".to_owned()))?;

        // Required fields are reported in a fixed order, one at a time.
        let host = required(raw.host, "host")?;
        let port = required(raw.port, "port")?;
        let remote_path = required(raw.path, "path")?;
        let user = required(raw.user, "user")?;
        let password = required(raw.password, "password")?;

        let port = port.trim().parse::<u16>().ok().filter(|p| *p != 0).ok_or_else(|| {
            ConfigError::Validation(format!("upload.port must be a port number, got '{port}'"))
        })?;

        let upload_rewrite_rules = match raw.upload_htaccess {
            None => false,
            Some(Scalar::Bool(b)) => b,
            Some(other) => other.into_string().trim().eq_ignore_ascii_case("true"),
        };

        Ok(Self {
            host: expand_references("host", &host)?,
            port,
            remote_path: expand_references("path", &remote_path)?,
            user: expand_references("user", &user)?,
            password: expand_references("password", &password)?,
            upload_rewrite_rules,
        })
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references in an upload field.
///
/// Only braced references are handed to the expander. Every other `$` is
/// literal, so a password such as `pa$$word` or `p$ss${SUFFIX}` keeps its
/// dollars. An unterminated `${` is also kept as written.
fn expand_references(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(close) = rest[start..].find('}').map(|offset| start + offset) else {
            break;
        };
        expanded.push_str(&rest[..start]);
        let reference = &rest[start..=close];
        let resolved = shellexpand::env_with_context(reference, lookup).map_err(|err| {
            ConfigError::EnvVar {
                field: format!("upload.{field}"),
                message: format!("${{{}}} not set", err.var_name),
            }
        })?;
        expanded.push_str(&resolved);
        rest = &rest[close + 1..];
    }
    expanded.push_str(rest);
    Ok(expanded)
}

fn lookup(var: &str) -> Result<Option<String>, VarError> {
    env::var(var).map(Some)
}

fn required(value: Option<Scalar>, field: &'static str) -> Result<String, ConfigError> {
    let value = value.map(Scalar::into_string);
    non_empty(value.as_ref())
        .map(str::to_owned)
        .ok_or(ConfigError::MissingUploadField { field })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FULL: &str = r"
upload:
  host: example.com
  port: 2222
  path: /var/www/site
  user: deploy
  password: hunter2
  upload_htaccess: 'True'
";

    #[test]
    fn test_parse_full_config() {
        let config = UploadConfig::from_yaml(FULL).unwrap();
        assert_eq!(
            config,
            UploadConfig {
                host: "example.com".to_owned(),
                port: 2222,
                remote_path: "/var/www/site".to_owned(),
                user: "deploy".to_owned(),
                password: "hunter2".to_owned(),
                upload_rewrite_rules: true,
            }
        );
        assert_eq!(config.address(), "example.com:2222");
    }

    #[test]
    fn test_port_as_string_and_bool_flag() {
        let yaml = r"
upload: {host: h, port: '22', path: /srv, user: u, password: p, upload_htaccess: false}
";
        let config = UploadConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.port, 22);
        assert!(!config.upload_rewrite_rules);
    }

    #[test]
    fn test_rewrite_rules_skipped_by_default() {
        let yaml = "upload: {host: h, port: 22, path: /srv, user: u, password: p}";
        let config = UploadConfig::from_yaml(yaml).unwrap();
        assert!(!config.upload_rewrite_rules);
    }

    #[test]
    fn test_missing_password_is_named() {
        let yaml = "upload: {host: h, port: 22, path: /srv, user: u}";
        let err = UploadConfig::from_yaml(yaml).unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingUploadField { field: "password" }),
            "got {err:?}"
        );
        assert!(err.to_string().contains("Password"));
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let err = UploadConfig::from_yaml("upload: {user: u}").unwrap_err();
        assert!(matches!(err, ConfigError::MissingUploadField { field: "host" }));

        let err = UploadConfig::from_yaml("upload: {host: h, user: u}").unwrap_err();
        assert!(matches!(err, ConfigError::MissingUploadField { field: "port" }));

        let err = UploadConfig::from_yaml("upload: {host: h, port: 22, user: u}").unwrap_err();
        assert!(matches!(err, ConfigError::MissingUploadField { field: "path" }));
    }

    #[test]
    fn test_invalid_port() {
        let yaml = "upload: {host: h, port: ssh, path: /srv, user: u, password: p}";
        let err = UploadConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn test_missing_upload_section() {
        let err = UploadConfig::from_yaml("other: 1").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = UploadConfig::from_yaml(FULL).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_password_from_environment() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SNATIC_TEST_SFTP_PASSWORD", "from-env");
        }
        let yaml = "upload: {host: h, port: 22, path: /srv, user: u, password: '${SNATIC_TEST_SFTP_PASSWORD}'}";
        let config = UploadConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.password, "from-env");
        unsafe {
            std::env::remove_var("SNATIC_TEST_SFTP_PASSWORD");
        }
    }

    #[test]
    fn test_reference_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SNATIC_TEST_SFTP_HOST");
        }
        let yaml = "upload: {host: '${SNATIC_TEST_SFTP_HOST:-sftp.example.com}', port: 22, path: /srv, user: u, password: p}";
        let config = UploadConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.host, "sftp.example.com");
    }

    #[test]
    fn test_unset_reference_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SNATIC_TEST_SFTP_USER");
        }
        let yaml = "upload: {host: h, port: 22, path: /srv, user: '${SNATIC_TEST_SFTP_USER}', password: p}";
        let err = UploadConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }), "got {err:?}");
        let message = err.to_string();
        assert!(message.contains("upload.user"), "{message}");
        assert!(message.contains("SNATIC_TEST_SFTP_USER"), "{message}");
    }

    #[test]
    fn test_bare_dollars_are_literal() {
        assert_eq!(expand_references("password", "pa$$word").unwrap(), "pa$$word");
        assert_eq!(expand_references("password", "p$ss${").unwrap(), "p$ss${");

        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SNATIC_TEST_SFTP_SUFFIX", "42");
        }
        let expanded = expand_references("password", "p$ss${SNATIC_TEST_SFTP_SUFFIX}$HOME").unwrap();
        unsafe {
            std::env::remove_var("SNATIC_TEST_SFTP_SUFFIX");
        }
        assert_eq!(expanded, "p$ss42$HOME");
    }

    #[test]
    fn test_load_missing_file() {
        let err = UploadConfig::load(Path::new("/nonexistent/upload.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
