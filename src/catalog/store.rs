//! Package metadata store: one backend, one cache, one query collaborator.
//!
//! The store only ever reads package state or regenerates its own derived
//! snapshot. Failures of the underlying tools surface as `Err` from the
//! `Result` methods; the `find_*` and `is_installed` helpers fold them into
//! "no data" because a broken package tool must never break the shell.

use crate::catalog::{CatalogIndex, CatalogQuery, MetadataCache, PackageRecord};
use crate::connectors::Backend;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct PackageStore<Q> {
    backend: Backend,
    cache: MetadataCache,
    query: Q,
    manifest_dir: Option<PathBuf>,
}

impl<Q: CatalogQuery> PackageStore<Q> {
    /// Store over a flat catalog snapshot.
    pub fn flat(cache: MetadataCache, query: Q) -> Self {
        Self {
            backend: Backend::Flat,
            cache,
            query,
            manifest_dir: None,
        }
    }

    /// Store over ownership data gathered from every manifest in `dir`.
    pub fn manifest(cache: MetadataCache, query: Q, dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Manifest,
            cache,
            query,
            manifest_dir: Some(dir.into()),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// Regenerate the snapshot if it is missing or stale.
    pub fn ensure_fresh(&self) -> Result<bool> {
        self.cache.ensure_fresh(|| self.generate())
    }

    /// Delete and regenerate the snapshot regardless of its age.
    pub fn rebuild(&self) -> Result<()> {
        self.cache.rebuild(|| self.generate())
    }

    /// Fresh snapshot parsed for lookups.
    pub fn index(&self) -> Result<CatalogIndex> {
        self.ensure_fresh()?;
        let snapshot = self.cache.read()?;
        Ok(CatalogIndex::parse(self.backend, snapshot))
    }

    /// Every `(name, description)` pair known to the catalog.
    pub fn all_records(&self) -> Result<Vec<PackageRecord>> {
        let index = self.index()?;
        Ok(index
            .packages()
            .into_iter()
            .map(|(name, description)| PackageRecord::new(name, description))
            .collect())
    }

    /// Every `(path, name, description)` ownership triple.
    pub fn all_ownership_triples(&self) -> Result<Vec<PackageRecord>> {
        if !self.backend.tracks_ownership() {
            bail!("the {} backend does not record file ownership", self.backend.as_str());
        }
        Ok(self.index()?.records().to_vec())
    }

    pub fn find_owner(&self, command: &str) -> Option<PackageRecord> {
        self.index_or_empty().find_owner(command)
    }

    pub fn find_similar(&self, pattern: &str, max_results: usize) -> Vec<PackageRecord> {
        self.index_or_empty().find_similar(pattern, max_results)
    }

    /// Installed state; an unavailable query tool reads as "not installed".
    pub fn is_installed(&self, package: &str) -> bool {
        match self.query.is_installed(package) {
            Ok(installed) => installed,
            Err(err) => {
                debug!("installed-state query failed for {package}: {err:#}");
                false
            }
        }
    }

    /// Snapshot for lookups, or an empty index when no data can be had.
    pub fn index_or_empty(&self) -> CatalogIndex {
        match self.index() {
            Ok(index) => index,
            Err(err) => {
                warn!("package metadata unavailable: {err:#}");
                CatalogIndex::empty(self.backend)
            }
        }
    }

    fn generate(&self) -> Result<String> {
        match self.backend {
            Backend::Flat => self.query.catalog().context("querying package catalog"),
            Backend::Manifest => {
                let dir = self
                    .manifest_dir
                    .as_deref()
                    .context("manifest backend requires a manifest directory")?;
                self.scan_manifests(dir)
            }
        }
    }

    fn scan_manifests(&self, dir: &Path) -> Result<String> {
        let manifests = list_manifests(dir)?;
        let mut combined = String::new();
        for manifest in &manifests {
            match self.query.ownership(manifest) {
                Ok(lines) => {
                    combined.push_str(&lines);
                    if !lines.is_empty() && !lines.ends_with('\n') {
                        combined.push('\n');
                    }
                }
                Err(err) => warn!("skipping manifest {}: {err:#}", manifest.display()),
            }
        }
        Ok(combined)
    }
}

/// Regular files in `dir`, sorted by file name.
pub fn list_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut manifests = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("reading manifest directory {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            manifests.push(path);
        }
    }
    manifests.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(manifests)
}
