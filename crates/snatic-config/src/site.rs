//! Site configuration (`data/site.yaml`).
//!
//! The file is first deserialized into [`RawSiteConfig`], where every field is
//! optional exactly as authored, and then checked by [`validate`] into an
//! immutable [`SiteConfig`]. Page and menu order is the declaration order.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::{ConfigError, ProjectLayout, non_empty};

/// Key of the mandatory home page (compared case-insensitively).
const HOME_KEY: &str = "home";
const HOME_FILENAME: &str = "index.html";
const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Site configuration as authored.
#[derive(Debug, Default, Deserialize)]
pub struct RawSiteConfig {
    #[serde(default)]
    pub site_config: Option<RawSiteSection>,
    #[serde(default)]
    pub pages: Option<IndexMap<String, RawPage>>,
    #[serde(default)]
    pub menu: Option<IndexMap<String, RawMenuEntry>>,
}

/// The `site_config` section.
#[derive(Debug, Default, Deserialize)]
pub struct RawSiteSection {
    pub name: Option<String>,
    pub theme: Option<String>,
    pub dt_format: Option<String>,
    pub minify_html: Option<bool>,
}

/// One entry of the `pages` section.
#[derive(Debug, Default, Deserialize)]
pub struct RawPage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub file: Option<String>,
    pub categories: Option<String>,
    pub creation_date: Option<String>,
}

/// One entry of the `menu` section.
#[derive(Debug, Default, Deserialize)]
pub struct RawMenuEntry {
    pub title: Option<String>,
    pub page_id: Option<String>,
    pub parent_id: Option<String>,
}

/// Validated site configuration.
#[derive(Debug)]
pub struct SiteConfig {
    /// Site name shown by every template.
    pub name: String,
    /// Active theme name.
    pub theme: String,
    /// Resolved theme directory (guaranteed to exist at validation time).
    pub theme_dir: PathBuf,
    /// strftime format for the build date.
    pub date_format: String,
    /// Collapse whitespace in rendered HTML.
    pub minify_html: bool,
    pages: Vec<PageSpec>,
    menu: Option<Vec<MenuEntrySpec>>,
}

/// A validated page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageSpec {
    /// Key of the page in the `pages` section.
    pub key: String,
    pub title: String,
    /// URL segment; empty for home.
    pub slug: String,
    /// Output file name inside `html/`.
    pub filename: String,
    pub kind: PageKind,
    /// Lower-cased categories, declaration order, no duplicates.
    pub categories: Vec<String>,
    pub creation_date: Option<String>,
}

/// Page type with its type-specific input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageKind {
    /// Markdown-backed page; `source` is relative to the content directory.
    Page { source: PathBuf },
    /// Listing of other pages selected by category.
    Archive { filter: CategoryFilter },
}

/// Category selection of an archive page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CategoryFilter {
    /// `*`: every candidate page.
    All,
    /// Pages sharing at least one of these lower-cased categories.
    AnyOf(BTreeSet<String>),
}

/// A validated menu entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntrySpec {
    pub item_id: String,
    pub title: String,
    /// Target page key (or `home`).
    pub page_id: String,
    pub parent_id: Option<String>,
}

impl CategoryFilter {
    /// Parse an archive's `categories` value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim() == "*" {
            return Self::All;
        }
        Self::AnyOf(split_categories(value).into_iter().collect())
    }

    /// Whether a page with `categories` (lower-cased) is selected.
    #[must_use]
    pub fn matches(&self, categories: &[String]) -> bool {
        match self {
            Self::All => true,
            Self::AnyOf(wanted) => categories.iter().any(|c| wanted.contains(c)),
        }
    }
}

impl PageSpec {
    /// Whether this is the home page.
    #[must_use]
    pub fn is_home(&self) -> bool {
        is_home_key(&self.key)
    }

    /// Whether this page is an archive.
    #[must_use]
    pub fn is_archive(&self) -> bool {
        matches!(self.kind, PageKind::Archive { .. })
    }

    /// Site-absolute URL: `/` for home, `/{slug}` otherwise.
    #[must_use]
    pub fn url(&self) -> String {
        if self.is_home() {
            "/".to_owned()
        } else {
            format!("/{}", self.slug)
        }
    }
}

impl SiteConfig {
    /// Load and validate `data/site.yaml` of `layout`.
    pub fn load(layout: &ProjectLayout) -> Result<Self, ConfigError> {
        let path = layout.site_config_file();
        let raw = read_yaml::<RawSiteConfig>(&path)?;
        validate(raw, layout)
    }

    /// Parse and validate configuration text.
    pub fn from_yaml(content: &str, layout: &ProjectLayout) -> Result<Self, ConfigError> {
        let raw: Option<RawSiteConfig> = serde_yaml::from_str(content)?;
        validate(raw.unwrap_or_default(), layout)
    }

    /// Pages in declaration order.
    #[must_use]
    pub fn pages(&self) -> &[PageSpec] {
        &self.pages
    }

    /// Look up a page by key (home is matched case-insensitively).
    #[must_use]
    pub fn page(&self, key: &str) -> Option<&PageSpec> {
        self.pages
            .iter()
            .find(|p| p.key == key || (is_home_key(key) && p.is_home()))
    }

    /// Menu entries in declaration order, `None` when there is no `menu` section.
    #[must_use]
    pub fn menu_entries(&self) -> Option<&[MenuEntrySpec]> {
        self.menu.as_deref()
    }

    /// URL of the page with `key`.
    #[must_use]
    pub fn url_for_page(&self, key: &str) -> Option<String> {
        if is_home_key(key) {
            return Some("/".to_owned());
        }
        self.page(key).map(PageSpec::url)
    }
}

/// Validate raw configuration into a [`SiteConfig`].
///
/// Checks run in a fixed order and stop at the first violation: site name,
/// home page, `site_config` section, theme name, theme directory, then page
/// types and fields, slug uniqueness, menu targets and the date format.
pub fn validate(raw: RawSiteConfig, layout: &ProjectLayout) -> Result<SiteConfig, ConfigError> {
    let RawSiteConfig {
        site_config,
        pages,
        menu,
    } = raw;
    let pages = pages.unwrap_or_default();

    if let Some(section) = &site_config
        && non_empty(section.name.as_ref()).is_none()
    {
        return Err(ConfigError::MissingSiteName);
    }
    if !pages.keys().any(|k| is_home_key(k)) {
        return Err(ConfigError::MissingHome);
    }
    let section = site_config.ok_or(ConfigError::MissingSiteConfig)?;
    let theme = non_empty(section.theme.as_ref())
        .ok_or(ConfigError::MissingTheme)?
        .to_owned();
    let theme_dir = layout.theme_dir(&theme);
    if !theme_dir.is_dir() {
        return Err(ConfigError::ThemeNotFound {
            name: theme,
            path: theme_dir,
        });
    }

    let pages = pages
        .into_iter()
        .map(|(key, page)| validate_page(key, page))
        .collect::<Result<Vec<_>, _>>()?;
    check_unique_filenames(&pages)?;

    let menu = menu
        .map(|entries| validate_menu(entries, &pages))
        .transpose()?;

    let date_format = section
        .dt_format
        .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_owned());
    if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidDateFormat(date_format));
    }

    Ok(SiteConfig {
        name: section.name.unwrap_or_default().trim().to_owned(),
        theme,
        theme_dir,
        date_format,
        minify_html: section.minify_html.unwrap_or(false),
        pages,
        menu,
    })
}

fn validate_page(key: String, raw: RawPage) -> Result<PageSpec, ConfigError> {
    let missing = |field| ConfigError::MissingPageField {
        page: key.clone(),
        field,
    };

    let kind_name = non_empty(raw.kind.as_ref()).ok_or_else(|| missing("type"))?;
    let kind = match kind_name.to_lowercase().as_str() {
        "page" => PageKind::Page {
            source: PathBuf::from(non_empty(raw.file.as_ref()).ok_or_else(|| missing("file"))?),
        },
        "archive" => PageKind::Archive {
            filter: CategoryFilter::parse(
                non_empty(raw.categories.as_ref()).ok_or_else(|| missing("categories"))?,
            ),
        },
        _ => {
            return Err(ConfigError::InvalidPageType {
                page: key.clone(),
                kind: kind_name.to_owned(),
            });
        }
    };
    let title = non_empty(raw.title.as_ref())
        .ok_or_else(|| missing("title"))?
        .to_owned();

    // The home page always lives at the site root, whatever slug was authored.
    let (slug, filename) = if is_home_key(&key) {
        (String::new(), HOME_FILENAME.to_owned())
    } else {
        let slug = non_empty(raw.slug.as_ref())
            .ok_or_else(|| missing("slug"))?
            .trim_matches('/')
            .to_owned();
        if slug.is_empty() {
            return Err(missing("slug"));
        }
        let filename = format!("{slug}.html");
        (slug, filename)
    };

    // Archive filters reuse `categories`; only pages carry their own set.
    let categories = match &kind {
        PageKind::Page { .. } => raw
            .categories
            .as_deref()
            .map(split_categories)
            .unwrap_or_default(),
        PageKind::Archive { .. } => Vec::new(),
    };

    Ok(PageSpec {
        key,
        title,
        slug,
        filename,
        kind,
        categories,
        creation_date: raw.creation_date,
    })
}

fn check_unique_filenames(pages: &[PageSpec]) -> Result<(), ConfigError> {
    let mut seen: HashMap<&str, &PageSpec> = HashMap::new();
    for page in pages {
        if let Some(first) = seen.insert(&page.filename, page) {
            return Err(ConfigError::DuplicateSlug {
                first: first.key.clone(),
                second: page.key.clone(),
                slug: page
                    .filename
                    .trim_end_matches(".html")
                    .to_owned(),
            });
        }
    }
    Ok(())
}

fn validate_menu(
    entries: IndexMap<String, RawMenuEntry>,
    pages: &[PageSpec],
) -> Result<Vec<MenuEntrySpec>, ConfigError> {
    entries
        .into_iter()
        .map(|(item_id, raw)| {
            let missing = |field| ConfigError::MissingMenuField {
                item: item_id.clone(),
                field,
            };
            let title = non_empty(raw.title.as_ref())
                .ok_or_else(|| missing("title"))?
                .to_owned();
            let page_id = non_empty(raw.page_id.as_ref())
                .ok_or_else(|| missing("page_id"))?
                .to_owned();
            let resolves = is_home_key(&page_id) || pages.iter().any(|p| p.key == page_id);
            if !resolves {
                return Err(ConfigError::UnknownMenuTarget {
                    item: item_id,
                    page: page_id,
                });
            }
            Ok(MenuEntrySpec {
                item_id,
                title,
                page_id,
                parent_id: non_empty(raw.parent_id.as_ref()).map(str::to_owned),
            })
        })
        .collect()
}

/// Split a comma-separated category list into trimmed, lower-cased, unique names.
fn split_categories(value: &str) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for category in value.split(',').map(|c| c.trim().to_lowercase()) {
        if !category.is_empty() && !categories.contains(&category) {
            categories.push(category);
        }
    }
    categories
}

fn is_home_key(key: &str) -> bool {
    key.eq_ignore_ascii_case(HOME_KEY)
}

/// Read and deserialize a YAML file, rejecting empty documents.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let parsed: Option<T> = serde_yaml::from_str(&content)?;
    parsed.ok_or_else(|| ConfigError::Empty(path.to_path_buf()))
}
