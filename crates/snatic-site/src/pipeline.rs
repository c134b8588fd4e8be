//! Build pipeline.
//!
//! One pass, no retries:
//!
//! 1. load and validate `site.yaml` (nothing on disk is touched before this succeeds)
//! 2. delete and recreate the output root and its HTML directory
//! 3. build every page in declaration order, collecting one route per page
//! 4. render the front controller from the collected routes
//! 5. render the rewrite rules
//! 6. copy content assets and theme assets
//!
//! A failure stops the pipeline where it happened; earlier stages are not
//! rolled back.

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, Local};
use minijinja::context;
use serde::Serialize;
use snatic_config::{ConfigError, ProjectLayout, SiteConfig};

use crate::BuildError;
use crate::assets::copy_dir;
use crate::menu::MenuTree;
use crate::pages::PageBuilder;
use crate::templates::{self, Templates};

/// Source of the build date shown on pages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BuildClock {
    /// Local time when the build starts.
    #[default]
    Local,
    /// A fixed instant.
    Fixed(DateTime<FixedOffset>),
}

impl BuildClock {
    #[must_use]
    pub fn now(self) -> DateTime<FixedOffset> {
        match self {
            Self::Local => Local::now().fixed_offset(),
            Self::Fixed(instant) => instant,
        }
    }
}

/// Route served by the front controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// URL segment; empty for home.
    pub slug: String,
    /// File inside `html/`.
    pub filename: String,
}

/// Outcome of a successful build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// One route per built page, in declaration order.
    pub routes: Vec<RouteEntry>,
    /// Files written to `html/`.
    pub pages: Vec<PathBuf>,
    /// Asset files copied (content and theme assets).
    pub assets: usize,
}

/// Builds a project into its output directory.
pub struct SiteBuilder {
    layout: ProjectLayout,
    clock: BuildClock,
}

impl SiteBuilder {
    #[must_use]
    pub fn new(layout: ProjectLayout) -> Self {
        Self {
            layout,
            clock: BuildClock::default(),
        }
    }

    /// Use `clock` for the build date.
    #[must_use]
    pub fn with_clock(mut self, clock: BuildClock) -> Self {
        self.clock = clock;
        self
    }

    /// Load the site configuration and run the whole pipeline.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let config = SiteConfig::load(&self.layout)?;
        tracing::info!(site = %config.name, theme = %config.theme, "Configuration valid");
        self.build_with(&config)
    }

    /// Run the pipeline for an already validated configuration.
    pub fn build_with(&self, config: &SiteConfig) -> Result<BuildReport, BuildError> {
        let build_date = format_date(self.clock.now(), &config.date_format)?;
        let templates = Templates::new(&config.theme_dir)?;
        let menu = MenuTree::build(config);

        self.reset_output()?;

        let builder = PageBuilder {
            config,
            layout: &self.layout,
            menu: menu.as_ref(),
            templates: &templates,
            build_date: &build_date,
        };
        let mut report = BuildReport::default();
        for page in config.pages() {
            report.pages.push(builder.build(page)?);
            report.routes.push(RouteEntry {
                slug: page.slug.clone(),
                filename: page.filename.clone(),
            });
        }
        tracing::info!(pages = report.pages.len(), "Pages built");

        let application = templates.render_internal(
            templates::APPLICATION,
            context! { routes => &report.routes },
        )?;
        write(&self.layout.front_controller(), &application)?;
        tracing::info!(routes = report.routes.len(), "Front controller written");

        let rules = templates.render_internal(templates::REWRITE_RULES, context! {})?;
        write(&self.layout.rewrite_rules(), &rules)?;
        tracing::info!("Rewrite rules written");

        report.assets = self.copy_assets(config)?;
        tracing::info!(assets = report.assets, "Assets copied");

        Ok(report)
    }

    fn reset_output(&self) -> Result<(), BuildError> {
        let output_dir = self.layout.output_dir();
        if output_dir.exists() {
            fs::remove_dir_all(&output_dir).map_err(BuildError::io(&output_dir))?;
        }
        let html_dir = self.layout.html_dir();
        fs::create_dir_all(&html_dir).map_err(BuildError::io(&html_dir))?;
        tracing::info!(path = %output_dir.display(), "Output directory reset");
        Ok(())
    }

    fn copy_assets(&self, config: &SiteConfig) -> Result<usize, BuildError> {
        let pairs = [
            (self.layout.assets_dir(), self.layout.output_assets_dir()),
            (
                self.layout.theme_assets_dir(&config.theme),
                self.layout.output_theme_assets_dir(),
            ),
        ];
        let mut copied = 0;
        for (source, target) in pairs {
            if source.is_dir() {
                copied += copy_dir(&source, &target)?;
            } else {
                tracing::debug!(path = %source.display(), "No assets");
            }
        }
        Ok(copied)
    }
}

fn write(path: &Path, contents: &str) -> Result<(), BuildError> {
    fs::write(path, contents).map_err(BuildError::io(path))
}

fn format_date(instant: DateTime<FixedOffset>, format: &str) -> Result<String, BuildError> {
    let mut formatted = String::new();
    write!(formatted, "{}", instant.format(format))
        .map_err(|_| ConfigError::InvalidDateFormat(format.to_owned()))?;
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn instant() -> DateTime<FixedOffset> {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
            .and_local_timezone(FixedOffset::east_opt(2 * 3600).unwrap())
            .unwrap()
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(BuildClock::Fixed(instant()).now(), instant());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(instant(), "%d/%m/%Y %H:%M").unwrap(), "01/05/2024 09:30");
    }

    #[test]
    fn test_format_date_with_offset() {
        assert_eq!(
            format_date(instant(), "%Y-%m-%d %H:%M %z").unwrap(),
            "2024-05-01 09:30 +0200"
        );
    }

    #[test]
    fn test_local_clock_formats_timezone() {
        let formatted = format_date(BuildClock::Local.now(), "%Y-%m-%d %Z").unwrap();
        let (_, zone) = formatted.split_once(' ').unwrap();
        assert!(!zone.is_empty(), "{formatted}");
    }
}
