//! Runtime settings.
//!
//! Defaults suit a Debian-style host. Environment variables override the
//! defaults and command-line flags (applied by the binary) override both.
//!
//! | Variable                 | Meaning                                         |
//! |--------------------------|-------------------------------------------------|
//! | `CNF_BACKEND`            | `flat` or `manifest`                            |
//! | `CNF_CACHE_PATH`         | metadata snapshot location                      |
//! | `CNF_CACHE_MAX_AGE`      | staleness threshold in seconds                  |
//! | `CNF_MANIFEST_DIR`       | manifest directory for the `manifest` backend   |
//! | `CNF_CATALOG_COMMAND`    | catalog search command                          |
//! | `CNF_MANIFEST_COMMAND`   | per-manifest ownership query                    |
//! | `CNF_INSTALLED_COMMAND`  | installed-state query                           |
//! | `CNF_INSTALL_HINT`       | install suggestion template (`%s` = package)    |
//! | `CNF_SEARCH_HINT`        | manual search template (`%s` = command)         |
//! | `CNF_MAX_RESULTS`        | number of similar packages shown                |
//! | `CNF_LAYOUT_POLICY`      | `passthrough` or `first-byte`                   |
//! | `CNF_MESSAGES`           | JSON message catalog                            |
//!
//! `CNF_SYSTEM_DIRS` is read by [`crate::probe::HostProber::from_env`].

use crate::catalog::{DEFAULT_MAX_AGE, DEFAULT_MAX_RESULTS, MetadataCache, PackageStore, SystemCatalogQuery};
use crate::connectors::{Backend, CommandSpec, env_non_empty};
use crate::i18n::{MessageCatalog, Translator, Untranslated};
use crate::layout::UnmappedPolicy;
use crate::render::Hints;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MANIFEST_DIR: &str = "/var/cache/command-not-found/manifests";
const CACHE_DIR_NAME: &str = "command-not-found";

#[derive(Clone, Debug)]
pub struct Settings {
    pub backend: Backend,
    /// Explicit snapshot location; derived from the backend when unset.
    pub cache_path: Option<PathBuf>,
    pub max_age: Duration,
    pub manifest_dir: PathBuf,
    pub query: SystemCatalogQuery,
    pub hints: Hints,
    pub max_results: usize,
    pub policy: UnmappedPolicy,
    pub messages: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            cache_path: None,
            max_age: DEFAULT_MAX_AGE,
            manifest_dir: PathBuf::from(DEFAULT_MANIFEST_DIR),
            query: SystemCatalogQuery::default(),
            hints: Hints::default(),
            max_results: DEFAULT_MAX_RESULTS,
            policy: UnmappedPolicy::default(),
            messages: None,
        }
    }
}

impl Settings {
    /// Settings from the process environment.
    ///
    /// A malformed variable is logged and skipped.
    pub fn from_env() -> Self {
        let (settings, problems) = Self::load(env_non_empty);
        for problem in &problems {
            tracing::warn!("ignoring setting: {problem:#}");
        }
        settings
    }

    /// Build settings from an arbitrary variable source, failing on the
    /// first malformed value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (settings, problems) = Self::load(lookup);
        match problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(settings),
        }
    }

    /// Apply every well-formed variable and collect the malformed ones.
    pub fn load<F>(lookup: F) -> (Self, Vec<anyhow::Error>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let mut problems = Vec::new();

        if let Some(raw) = lookup("CNF_BACKEND") {
            assign(&mut problems, &mut settings.backend, Backend::try_from(raw.trim()));
        }
        if let Some(raw) = lookup("CNF_CACHE_PATH") {
            settings.cache_path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = lookup("CNF_CACHE_MAX_AGE") {
            let parsed = parse_seconds(&raw).context("parsing CNF_CACHE_MAX_AGE");
            assign(&mut problems, &mut settings.max_age, parsed);
        }
        if let Some(raw) = lookup("CNF_MANIFEST_DIR") {
            settings.manifest_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("CNF_CATALOG_COMMAND") {
            let parsed = CommandSpec::parse(&raw).context("parsing CNF_CATALOG_COMMAND");
            assign(&mut problems, &mut settings.query.search, parsed);
        }
        if let Some(raw) = lookup("CNF_MANIFEST_COMMAND") {
            let parsed = CommandSpec::parse(&raw).context("parsing CNF_MANIFEST_COMMAND");
            assign(&mut problems, &mut settings.query.ownership, parsed);
        }
        if let Some(raw) = lookup("CNF_INSTALLED_COMMAND") {
            let parsed = CommandSpec::parse(&raw).context("parsing CNF_INSTALLED_COMMAND");
            assign(&mut problems, &mut settings.query.installed, parsed);
        }
        if let Some(raw) = lookup("CNF_INSTALL_HINT") {
            settings.hints.install = raw;
        }
        if let Some(raw) = lookup("CNF_SEARCH_HINT") {
            settings.hints.search = raw;
        }
        if let Some(raw) = lookup("CNF_MAX_RESULTS") {
            let parsed = raw
                .trim()
                .parse()
                .with_context(|| format!("CNF_MAX_RESULTS must be a number, got {raw:?}"));
            assign(&mut problems, &mut settings.max_results, parsed);
        }
        if let Some(raw) = lookup("CNF_LAYOUT_POLICY") {
            assign(&mut problems, &mut settings.policy, UnmappedPolicy::try_from(raw.trim()));
        }
        if let Some(raw) = lookup("CNF_MESSAGES") {
            settings.messages = Some(PathBuf::from(raw));
        }

        (settings, problems)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_path
            .clone()
            .unwrap_or_else(|| default_cache_path(self.backend, env_non_empty))
    }

    pub fn cache(&self) -> MetadataCache {
        MetadataCache::new(self.cache_path(), self.max_age)
    }

    pub fn store(&self) -> PackageStore<SystemCatalogQuery> {
        match self.backend {
            Backend::Flat => PackageStore::flat(self.cache(), self.query.clone()),
            Backend::Manifest => {
                PackageStore::manifest(self.cache(), self.query.clone(), &self.manifest_dir)
            }
        }
    }

    /// Message lookup; a catalog that fails to load falls back to the
    /// untranslated keys.
    pub fn translator(&self) -> Box<dyn Translator> {
        let Some(path) = &self.messages else {
            return Box::new(Untranslated);
        };
        match MessageCatalog::load(path) {
            Ok(catalog) => Box::new(catalog),
            Err(err) => {
                tracing::warn!("ignoring message catalog: {err:#}");
                Box::new(Untranslated)
            }
        }
    }
}

/// Snapshot location when none is configured.
///
/// Order: build-time `CNF_CACHE_PATH_HINT` directory, `$XDG_CACHE_HOME`,
/// `$HOME/.cache`, then the system temp directory.
pub fn default_cache_path<F>(backend: Backend, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let file_name = match backend {
        Backend::Flat => "packages.txt",
        Backend::Manifest => "owners.txt",
    };
    if let Some(hint) = option_env!("CNF_CACHE_PATH_HINT") {
        return PathBuf::from(hint).join(file_name);
    }
    let base = lookup("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| lookup("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .unwrap_or_else(env::temp_dir);
    base.join(CACHE_DIR_NAME).join(file_name)
}

fn assign<T>(problems: &mut Vec<anyhow::Error>, slot: &mut T, parsed: Result<T>) {
    match parsed {
        Ok(value) => *slot = value,
        Err(err) => problems.push(err),
    }
}

pub fn parse_seconds(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("expected a number of seconds, got {raw:?}"))?;
    Ok(Duration::from_secs(secs))
}
