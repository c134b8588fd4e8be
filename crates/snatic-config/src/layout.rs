//! Filesystem layout of a snatic project.

use std::path::{Path, PathBuf};

const DATA_DIR: &str = "data";
const SITE_CONFIG_FILENAME: &str = "site.yaml";
const UPLOAD_CONFIG_FILENAME: &str = "upload.yaml";
const CONTENT_DIR: &str = "content";
const ASSETS_DIR: &str = "assets";
const THEMES_DIR: &str = "themes";
const OUTPUT_DIR: &str = "site";
const HTML_DIR: &str = "html";
const THEME_ASSETS_DIR: &str = "theme-assets";
const FRONT_CONTROLLER: &str = "index.php";
const REWRITE_RULES: &str = ".htaccess";

/// Resolves every input and output location of a project from its root.
///
/// ```text
/// {root}/
/// +-- data/
/// |   +-- site.yaml
/// |   +-- upload.yaml
/// |   +-- content/        # markdown sources
/// |   +-- assets/         # copied to site/assets
/// +-- themes/{theme}/     # page.j2, archive.j2, assets/
/// +-- site/               # output root, regenerated on every build
///     +-- html/
///     +-- index.php
///     +-- .htaccess
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Search for a project root in `start` and its parents.
    ///
    /// A directory is a project root if it contains `data/site.yaml`.
    #[must_use]
    pub fn discover(start: &Path) -> Option<Self> {
        let mut current = start.to_path_buf();
        loop {
            if current.join(DATA_DIR).join(SITE_CONFIG_FILENAME).exists() {
                return Some(Self::new(current));
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Project root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn site_config_file(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(SITE_CONFIG_FILENAME)
    }

    #[must_use]
    pub fn upload_config_file(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(UPLOAD_CONFIG_FILENAME)
    }

    /// Directory holding the markdown sources.
    #[must_use]
    pub fn content_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(CONTENT_DIR)
    }

    /// Content assets copied verbatim into the output root.
    #[must_use]
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR).join(ASSETS_DIR)
    }

    #[must_use]
    pub fn themes_dir(&self) -> PathBuf {
        self.root.join(THEMES_DIR)
    }

    #[must_use]
    pub fn theme_dir(&self, theme: &str) -> PathBuf {
        self.themes_dir().join(theme)
    }

    /// Theme-specific assets, copied to `site/theme-assets`.
    #[must_use]
    pub fn theme_assets_dir(&self, theme: &str) -> PathBuf {
        self.theme_dir(theme).join(ASSETS_DIR)
    }

    /// Output root.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR)
    }

    #[must_use]
    pub fn html_dir(&self) -> PathBuf {
        self.output_dir().join(HTML_DIR)
    }

    #[must_use]
    pub fn output_assets_dir(&self) -> PathBuf {
        self.output_dir().join(ASSETS_DIR)
    }

    #[must_use]
    pub fn output_theme_assets_dir(&self) -> PathBuf {
        self.output_dir().join(THEME_ASSETS_DIR)
    }

    /// Application bootstrap written at the output root.
    #[must_use]
    pub fn front_controller(&self) -> PathBuf {
        self.output_dir().join(FRONT_CONTROLLER)
    }

    /// Web server rewrite rules written at the output root.
    #[must_use]
    pub fn rewrite_rules(&self) -> PathBuf {
        self.output_dir().join(REWRITE_RULES)
    }

    /// File name of the rewrite rules inside the output root.
    #[must_use]
    pub fn rewrite_rules_filename() -> &'static str {
        REWRITE_RULES
    }
}
