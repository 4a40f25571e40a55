//! External package-manager queries.
//!
//! The package manager is an opaque collaborator. [`CatalogQuery`] is the
//! only surface the store talks to, so tests substitute in-memory fakes and
//! deployments choose the real tools through [`SystemCatalogQuery`].

use crate::connectors::CommandSpec;
use anyhow::Result;
use std::ffi::OsStr;
use std::path::Path;

pub trait CatalogQuery {
    /// Every known package, one `name - description` line each.
    fn catalog(&self) -> Result<String>;

    /// Ownership lines (`path\tname\tdescription`) for one manifest file.
    fn ownership(&self, manifest: &Path) -> Result<String>;

    /// Whether `package` is currently installed.
    fn is_installed(&self, package: &str) -> Result<bool>;
}

/// Queries backed by the host's package tools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemCatalogQuery {
    pub search: CommandSpec,
    pub ownership: CommandSpec,
    pub installed: CommandSpec,
}

impl SystemCatalogQuery {
    pub fn default_search() -> CommandSpec {
        CommandSpec::new("apt-cache", ["search", "."])
    }

    pub fn default_ownership() -> CommandSpec {
        CommandSpec::new(
            "rpm",
            ["-qp", "--qf", "[%{FILENAMES}\\t%{NAME}\\t%{SUMMARY}\\n]"],
        )
    }

    pub fn default_installed() -> CommandSpec {
        CommandSpec::new("dpkg", ["-s"])
    }
}

impl Default for SystemCatalogQuery {
    fn default() -> Self {
        Self {
            search: Self::default_search(),
            ownership: Self::default_ownership(),
            installed: Self::default_installed(),
        }
    }
}

impl CatalogQuery for SystemCatalogQuery {
    fn catalog(&self) -> Result<String> {
        self.search.stdout(&[])
    }

    fn ownership(&self, manifest: &Path) -> Result<String> {
        self.ownership.stdout(&[manifest.as_os_str()])
    }

    fn is_installed(&self, package: &str) -> Result<bool> {
        self.installed.succeeds(&[OsStr::new(package)])
    }
}
