//! Parsed view of a metadata snapshot.
//!
//! The index keeps the raw snapshot for the flat backend (owner matching is
//! defined on catalog lines) alongside the parsed records used for
//! similarity ranking. Malformed lines are skipped one at a time; a bad line
//! never discards the rest of the snapshot.

use crate::catalog::resolve::{find_owner_in_catalog, find_owner_in_ownership, rank_similar};
use crate::catalog::PackageRecord;
use crate::connectors::Backend;
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct CatalogIndex {
    backend: Backend,
    snapshot: String,
    records: Vec<PackageRecord>,
    skipped: usize,
}

impl CatalogIndex {
    pub fn parse(backend: Backend, snapshot: String) -> Self {
        let mut records = Vec::new();
        let mut skipped = 0;
        for (idx, line) in snapshot.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parsed = match backend {
                Backend::Flat => PackageRecord::from_catalog_line(line),
                Backend::Manifest => PackageRecord::from_ownership_line(line),
            };
            match parsed {
                Some(record) => records.push(record),
                None => {
                    debug!(line = idx + 1, "skipping malformed metadata line");
                    skipped += 1;
                }
            }
        }
        Self {
            backend,
            snapshot,
            records,
            skipped,
        }
    }

    /// An index with no data, used when the metadata source is unavailable.
    pub fn empty(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn records(&self) -> &[PackageRecord] {
        &self.records
    }

    /// Number of lines that could not be parsed.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct `(name, description)` pairs in first-seen order.
    pub fn packages(&self) -> Vec<(&str, &str)> {
        let mut seen = BTreeSet::new();
        self.records
            .iter()
            .filter(|record| seen.insert(record.name.as_str()))
            .map(|record| (record.name.as_str(), record.description.as_str()))
            .collect()
    }

    pub fn find_owner(&self, command: &str) -> Option<PackageRecord> {
        match self.backend {
            Backend::Flat => find_owner_in_catalog(&self.snapshot, command),
            Backend::Manifest => find_owner_in_ownership(&self.records, command),
        }
    }

    pub fn find_similar(&self, pattern: &str, max_results: usize) -> Vec<PackageRecord> {
        rank_similar(&self.records, pattern, max_results)
    }
}
