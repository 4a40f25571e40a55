//! Package catalog wiring.
//!
//! This module wraps the host's package metadata so the resolver can ask two
//! questions: "which package provides this command?" and "which packages
//! look like this name?". Raw metadata comes from external tools through
//! [`CatalogQuery`], is snapshotted on disk by [`MetadataCache`], and is
//! parsed into a [`CatalogIndex`] for lookups. [`PackageStore`] ties the
//! three together for one backend.

pub mod cache;
pub mod index;
pub mod query;
pub mod resolve;
pub mod store;

pub use cache::{DEFAULT_MAX_AGE, MetadataCache};
pub use index::CatalogIndex;
pub use query::{CatalogQuery, SystemCatalogQuery};
pub use resolve::{DEFAULT_MAX_RESULTS, find_owner_in_catalog, find_owner_in_ownership, rank_similar};
pub use store::PackageStore;

use serde::Serialize;

/// One package as reported by the metadata source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub name: String,
    /// Owned file that matched, when the source reports ownership.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub description: String,
}

impl PackageRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            description: description.into(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Parse a catalog search line (`name - description`).
    ///
    /// Lines without the ` - ` separator keep their first word as the name.
    pub fn from_catalog_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        if let Some((name, description)) = line.split_once(" - ") {
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return None;
            }
            return Some(Self::new(name, description.trim()));
        }
        let name = line.split_whitespace().next()?;
        Some(Self::new(name, ""))
    }

    /// Parse an ownership line (`path\tname[\tdescription]`).
    pub fn from_ownership_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let mut fields = line.split('\t');
        let path = fields.next()?.trim();
        let name = fields.next()?.trim();
        if path.is_empty() || name.is_empty() {
            return None;
        }
        let description = fields.next().map(str::trim).unwrap_or_default();
        Some(Self::new(name, description).with_path(path))
    }
}
