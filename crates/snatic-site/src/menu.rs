//! Two-level navigation menu.

use std::collections::HashMap;

use serde::Serialize;
use snatic_config::{MenuEntrySpec, SiteConfig};

/// Menu node handed to templates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuNode {
    pub item_id: String,
    pub title: String,
    /// `/` for home, `/{slug}` otherwise.
    pub url: String,
    /// Second-level items; always empty on second-level nodes.
    pub children: Vec<MenuNode>,
}

/// Navigation built once per build from the `menu` section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MenuTree {
    items: Vec<MenuNode>,
}

impl MenuTree {
    /// Build the tree, or `None` when the site has no `menu` section.
    ///
    /// Top-level items are the entries without `parent_id`. Entries whose
    /// `parent_id` names a top-level item become its children; every other
    /// entry is dropped.
    #[must_use]
    pub fn build(config: &SiteConfig) -> Option<Self> {
        let entries = config.menu_entries()?;

        let mut items: Vec<MenuNode> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        for entry in entries.iter().filter(|e| e.parent_id.is_none()) {
            index.insert(&entry.item_id, items.len());
            items.push(node(config, entry));
        }

        for entry in entries {
            let Some(parent_id) = &entry.parent_id else {
                continue;
            };
            match index.get(parent_id.as_str()) {
                Some(&position) => items[position].children.push(node(config, entry)),
                None => tracing::debug!(
                    item = %entry.item_id,
                    parent = %parent_id,
                    "Menu item dropped: parent is not a top-level item"
                ),
            }
        }

        Some(Self { items })
    }

    /// Top-level items in declaration order.
    #[must_use]
    pub fn items(&self) -> &[MenuNode] {
        &self.items
    }
}

fn node(config: &SiteConfig, entry: &MenuEntrySpec) -> MenuNode {
    MenuNode {
        item_id: entry.item_id.clone(),
        title: entry.title.clone(),
        // Targets were resolved during validation.
        url: config
            .url_for_page(&entry.page_id)
            .unwrap_or_else(|| format!("/{}", entry.page_id)),
        children: Vec::new(),
    }
}
