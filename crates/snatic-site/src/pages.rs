//! Page type builders.
//!
//! Each [`PageSpec`] renders to exactly one file in the HTML directory. The
//! page kind is dispatched through one exhaustive match in
//! [`PageBuilder::build`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use minijinja::context;
use serde::Serialize;
use snatic_config::{CategoryFilter, PageKind, PageSpec, ProjectLayout, SiteConfig};

use crate::markdown::to_html;
use crate::menu::MenuTree;
use crate::minify::minify_html;
use crate::templates::{self, Templates};
use crate::BuildError;

/// A page listed by an archive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub page_id: String,
    pub page_title: String,
    pub url: String,
    pub categories: Vec<String>,
    pub creation_date: Option<String>,
}

/// Everything a page needs besides its own spec, shared by a whole build.
pub(crate) struct PageBuilder<'a> {
    pub config: &'a SiteConfig,
    pub layout: &'a ProjectLayout,
    pub menu: Option<&'a MenuTree>,
    pub templates: &'a Templates,
    /// Build date, formatted once per build.
    pub build_date: &'a str,
}

impl PageBuilder<'_> {
    /// Render `page` and write it to `html/<filename>`.
    pub fn build(&self, page: &PageSpec) -> Result<PathBuf, BuildError> {
        let html = match &page.kind {
            PageKind::Page { source } => self.render_page(page, source)?,
            PageKind::Archive { filter } => self.render_archive(page, filter)?,
        };
        let html = if self.config.minify_html {
            minify_html(&html)
        } else {
            html
        };

        let output = self.layout.html_dir().join(&page.filename);
        fs::write(&output, html).map_err(BuildError::io(&output))?;
        tracing::debug!(page = %page.key, path = %output.display(), "Page written");
        Ok(output)
    }

    fn render_page(&self, page: &PageSpec, source: &Path) -> Result<String, BuildError> {
        let path = self.layout.content_dir().join(source);
        let markdown = match fs::read_to_string(&path) {
            Ok(markdown) => markdown,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BuildError::MissingContent(path));
            }
            Err(e) => return Err(BuildError::io(path)(e)),
        };

        self.templates.render_theme(
            templates::PAGE,
            context! {
                name => &self.config.name,
                title => &page.title,
                content => to_html(&markdown),
                menu => self.menu,
                creation_date => &page.creation_date,
                build_date => self.build_date,
            },
        )
    }

    fn render_archive(&self, page: &PageSpec, filter: &CategoryFilter) -> Result<String, BuildError> {
        let pages = archive_entries(self.config, filter);
        tracing::debug!(page = %page.key, listed = pages.len(), "Archive");

        self.templates.render_theme(
            templates::ARCHIVE,
            context! {
                name => &self.config.name,
                menu => self.menu,
                title => &page.title,
                pages => pages,
            },
        )
    }
}

/// Pages an archive with `filter` lists, in declaration order.
///
/// Candidates are every page that is neither the home page nor an archive.
#[must_use]
pub fn archive_entries(config: &SiteConfig, filter: &CategoryFilter) -> Vec<ArchiveEntry> {
    config
        .pages()
        .iter()
        .filter(|page| !page.is_home() && !page.is_archive())
        .filter(|page| filter.matches(&page.categories))
        .map(|page| ArchiveEntry {
            page_id: page.key.clone(),
            page_title: page.title.clone(),
            url: page.url(),
            categories: page.categories.clone(),
            creation_date: page.creation_date.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SITE: &str = "
site_config:
  name: Example
  theme: plain
pages:
  home: {type: page, title: Home, file: home.md, categories: news}
  first: {type: page, title: First, slug: first, file: first.md, categories: 'A, b'}
  second: {type: page, title: Second, slug: second, file: second.md, categories: c}
  untagged: {type: page, title: Untagged, slug: untagged, file: untagged.md}
  blog: {type: archive, title: Blog, slug: blog, categories: '*'}
  tagged: {type: archive, title: Tagged, slug: tagged, categories: 'B,c'}
";

    struct Project {
        _dir: tempfile::TempDir,
        layout: ProjectLayout,
        config: SiteConfig,
        templates: Templates,
    }

    fn project(yaml: &str) -> Project {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let theme = layout.theme_dir("plain");
        fs::create_dir_all(&theme).unwrap();
        fs::write(
            theme.join("page.j2"),
            "<title>{{ title }} | {{ name }}</title>\n<main>\n{{ content }}</main>\n<footer>{{ build_date }}</footer>",
        )
        .unwrap();
        fs::write(
            theme.join("archive.j2"),
            "{{ title }}:{% for p in pages %} {{ p.page_id }}={{ p.url }}{% endfor %}",
        )
        .unwrap();
        fs::create_dir_all(layout.content_dir()).unwrap();
        fs::create_dir_all(layout.html_dir()).unwrap();

        let config = SiteConfig::from_yaml(yaml, &layout).unwrap();
        let templates = Templates::new(&theme).unwrap();
        Project {
            _dir: dir,
            layout,
            config,
            templates,
        }
    }

    fn builder(project: &Project) -> PageBuilder<'_> {
        PageBuilder {
            config: &project.config,
            layout: &project.layout,
            menu: None,
            templates: &project.templates,
            build_date: "2024-05-01",
        }
    }

    fn ids(entries: &[ArchiveEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.page_id.as_str()).collect()
    }

    #[test]
    fn test_wildcard_lists_all_candidates_in_order() {
        let project = project(SITE);
        let entries = archive_entries(&project.config, &CategoryFilter::All);
        assert_eq!(ids(&entries), vec!["first", "second", "untagged"]);
        assert_eq!(entries[0].url, "/first");
        assert_eq!(entries[0].categories, vec!["a", "b"]);
    }

    #[test]
    fn test_filter_uses_intersection() {
        let project = project(SITE);

        let entries = archive_entries(&project.config, &CategoryFilter::parse("b,c"));
        assert_eq!(ids(&entries), vec!["first", "second"]);

        let entries = archive_entries(&project.config, &CategoryFilter::parse("x,y"));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_page_renders_markdown_into_theme() {
        let project = project(SITE);
        fs::write(project.layout.content_dir().join("first.md"), "# First\n").unwrap();
        let page = project.config.page("first").unwrap();

        let output = builder(&project).build(page).unwrap();

        assert_eq!(output, project.layout.html_dir().join("first.html"));
        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "<title>First | Example</title>\n<main>\n<h1>First</h1>\n</main>\n<footer>2024-05-01</footer>"
        );
    }

    #[test]
    fn test_page_is_minified_when_enabled() {
        let yaml = SITE.replace("  theme: plain\n", "  theme: plain\n  minify_html: true\n");
        let project = project(&yaml);
        fs::write(project.layout.content_dir().join("first.md"), "# First\n").unwrap();
        let page = project.config.page("first").unwrap();

        let output = builder(&project).build(page).unwrap();

        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "<title>First | Example</title> <main> <h1>First</h1> </main> <footer>2024-05-01</footer>"
        );
    }

    #[test]
    fn test_archive_written_under_slug() {
        let project = project(SITE);
        let page = project.config.page("tagged").unwrap();

        let output = builder(&project).build(page).unwrap();

        assert_eq!(
            fs::read_to_string(output).unwrap(),
            "Tagged: first=/first second=/second"
        );
    }

    #[test]
    fn test_missing_content_file() {
        let project = project(SITE);
        let page = project.config.page("second").unwrap();

        let err = builder(&project).build(page).unwrap_err();

        assert!(
            matches!(&err, BuildError::MissingContent(path) if path.ends_with("second.md")),
            "got {err:?}"
        );
        assert!(!project.layout.html_dir().join("second.html").exists());
    }
}
