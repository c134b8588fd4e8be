//! Static site build for snatic.
//!
//! Turns a validated [`SiteConfig`](snatic_config::SiteConfig) and its
//! markdown content into an output tree:
//!
//! ```text
//! site/
//!   html/*.html      one file per configured page
//!   index.php        front controller routing each slug to its page
//!   .htaccess        rewrite rules sending requests to index.php
//!   assets/          copied from data/assets
//!   theme-assets/    copied from themes/<theme>/assets
//! ```
//!
//! # Example
//!
//! ```ignore
//! use snatic_config::ProjectLayout;
//! use snatic_site::SiteBuilder;
//!
//! let report = SiteBuilder::new(ProjectLayout::new("my-site")).build()?;
//! for route in &report.routes {
//!     println!("/{} -> {}", route.slug, route.filename);
//! }
//! ```

mod assets;
mod error;
mod markdown;
mod menu;
mod minify;
mod pages;
mod pipeline;
mod templates;

pub use assets::copy_dir;
pub use error::BuildError;
pub use markdown::to_html;
pub use menu::{MenuNode, MenuTree};
pub use minify::minify_html;
pub use pages::{ArchiveEntry, archive_entries};
pub use pipeline::{BuildClock, BuildReport, RouteEntry, SiteBuilder};
