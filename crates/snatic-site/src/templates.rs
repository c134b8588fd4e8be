//! Template lookup and rendering.
//!
//! Two [`minijinja`] environments are used: the active theme's directory,
//! which provides `page.j2` and `archive.j2`, and the internal templates
//! compiled into the binary that produce the front controller and the
//! rewrite rules.

use std::path::Path;

use minijinja::Environment;
use serde::Serialize;

use crate::BuildError;

pub(crate) const PAGE: &str = "page.j2";
pub(crate) const ARCHIVE: &str = "archive.j2";
pub(crate) const APPLICATION: &str = "application.j2";
pub(crate) const REWRITE_RULES: &str = "htaccess.j2";

const INTERNAL: &[(&str, &str)] = &[
    ("route.j2", include_str!("../templates/route.j2")),
    (APPLICATION, include_str!("../templates/application.j2")),
    (REWRITE_RULES, include_str!("../templates/htaccess.j2")),
];

/// Theme and internal template environments of one build.
pub struct Templates {
    theme: Environment<'static>,
    internal: Environment<'static>,
}

impl Templates {
    /// Load templates from `theme_dir` on demand.
    pub fn new(theme_dir: &Path) -> Result<Self, BuildError> {
        let mut theme = Environment::new();
        theme.set_loader(minijinja::path_loader(theme_dir));

        let mut internal = Environment::new();
        for &(name, source) in INTERNAL {
            internal
                .add_template(name, source)
                .map_err(|err| template_error(name, err))?;
        }

        Ok(Self { theme, internal })
    }

    /// Render a template of the active theme.
    pub fn render_theme<S: Serialize>(&self, name: &str, context: S) -> Result<String, BuildError> {
        render(&self.theme, name, context)
    }

    /// Render one of the built-in templates.
    pub fn render_internal<S: Serialize>(
        &self,
        name: &str,
        context: S,
    ) -> Result<String, BuildError> {
        render(&self.internal, name, context)
    }
}

fn render<S: Serialize>(env: &Environment<'_>, name: &str, context: S) -> Result<String, BuildError> {
    env.get_template(name)
        .and_then(|template| template.render(context))
        .map_err(|source| template_error(name, source))
}

fn template_error(name: &str, source: minijinja::Error) -> BuildError {
    BuildError::Template {
        name: name.to_owned(),
        source,
    }
}
