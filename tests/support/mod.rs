#![allow(dead_code)]

use anyhow::{Context, Result};
use command_not_found::{CatalogQuery, HostProber, MetadataCache, PackageStore};
use std::cell::Cell;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;
use tempfile::TempDir;

pub fn helper_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_command-not-found"))
}

pub fn make_executable(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// Write a `/bin/sh` script named `name` into `dir` and mark it executable.
pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))
        .with_context(|| format!("writing script {}", path.display()))?;
    make_executable(&path)?;
    Ok(path)
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    cmd.output()
        .with_context(|| format!("failed to run command: {cmd:?}"))
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Private `PATH`, system directory, and cache location for one test.
pub struct Sandbox {
    pub root: TempDir,
    pub bin: PathBuf,
    pub sbin: PathBuf,
    pub tools: PathBuf,
    pub cache: PathBuf,
}

impl Sandbox {
    pub fn new() -> Result<Self> {
        let root = TempDir::new()?;
        let bin = root.path().join("bin");
        let sbin = root.path().join("sbin");
        let tools = root.path().join("tools");
        for dir in [&bin, &sbin, &tools] {
            fs::create_dir_all(dir)?;
        }
        let cache = root.path().join("cache").join("packages.txt");
        Ok(Self {
            root,
            bin,
            sbin,
            tools,
            cache,
        })
    }

    /// Executable on the private `PATH`.
    pub fn install(&self, name: &str, body: &str) -> Result<PathBuf> {
        write_script(&self.bin, name, body)
    }

    /// Query tool kept off `PATH`, referenced by absolute path.
    pub fn tool(&self, name: &str, body: &str) -> Result<PathBuf> {
        write_script(&self.tools, name, body)
    }

    /// Prober limited to the sandbox directories, with no resolver fallback.
    pub fn prober(&self) -> HostProber {
        HostProber::new(
            Some(OsString::from(&self.bin)),
            vec![self.sbin.clone()],
            None,
        )
    }

    pub fn cache(&self, max_age: Duration) -> MetadataCache {
        MetadataCache::new(&self.cache, max_age)
    }

    /// The helper binary with a clean environment pointed at this sandbox.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(helper_binary());
        cmd.env_clear()
            .env("PATH", &self.bin)
            .env("HOME", self.root.path())
            .env("CNF_CACHE_PATH", &self.cache)
            .env("CNF_SYSTEM_DIRS", &self.sbin)
            .env(
                "CNF_INSTALLED_COMMAND",
                self.tools.join("not-installed").as_os_str(),
            );
        if let Some(tmp) = env::var_os("TMPDIR") {
            cmd.env("TMPDIR", tmp);
        }
        cmd
    }
}

/// In-memory package manager.
#[derive(Default)]
pub struct FakeQuery {
    pub catalog: Option<String>,
    pub installed: Vec<String>,
    pub catalog_calls: Cell<usize>,
}

impl FakeQuery {
    pub fn with_catalog(lines: &str) -> Self {
        Self {
            catalog: Some(lines.to_string()),
            ..Self::default()
        }
    }

    /// Every query fails, as if the tools were missing.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

impl CatalogQuery for FakeQuery {
    fn catalog(&self) -> Result<String> {
        self.catalog_calls.set(self.catalog_calls.get() + 1);
        self.catalog.clone().context("catalog tool unavailable")
    }

    fn ownership(&self, manifest: &Path) -> Result<String> {
        anyhow::bail!("no ownership data for {}", manifest.display())
    }

    fn is_installed(&self, package: &str) -> Result<bool> {
        Ok(self.installed.iter().any(|p| p == package))
    }
}

pub fn flat_store(sandbox: &Sandbox, query: FakeQuery) -> PackageStore<FakeQuery> {
    PackageStore::flat(sandbox.cache(Duration::from_secs(3600)), query)
}
