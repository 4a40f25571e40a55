//! Command existence probing.
//!
//! Two tiers with different meanings:
//! - the search-path tier answers "can this user run it by name right now?"
//!   and requires an executable file in a `PATH` directory;
//! - the system-directory tier answers "is it installed somewhere standard?"
//!   and only needs the file to exist. A hit here with a miss on the first
//!   tier means the command is installed but hidden (wrong `PATH`, or a
//!   root-only `sbin` tool), which deserves a different hint than "install
//!   it".
//!
//! Neither tier reports errors: unreadable directories, an unset `PATH`, or a
//! missing resolver utility all read as "not found".

use crate::connectors::{CommandSpec, env_non_empty};
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Canonical binary directories checked by the system tier, in order.
pub const SYSTEM_DIRECTORIES: &[&str] = &[
    "/bin",
    "/sbin",
    "/usr/bin",
    "/usr/sbin",
    "/usr/local/bin",
    "/usr/local/sbin",
    "/usr/games",
];

/// Default second-opinion resolver for the system tier.
pub const DEFAULT_RESOLVER: &str = "which";

const SYSTEM_DIRS_ENV: &str = "CNF_SYSTEM_DIRS";

/// Seam between the resolution pipeline and the host filesystem.
pub trait Prober {
    /// Executable copy of `name` reachable through the search path.
    fn on_search_path(&self, name: &OsStr) -> bool;

    /// Location of `name` in the system directories, whether or not it is
    /// executable by this user.
    fn system_location(&self, name: &OsStr) -> Option<PathBuf>;
}

/// Probes the real filesystem.
#[derive(Clone, Debug)]
pub struct HostProber {
    search_path: Option<OsString>,
    system_dirs: Vec<PathBuf>,
    resolver: Option<CommandSpec>,
}

impl HostProber {
    /// Snapshot of the current process environment with `which` as the
    /// fallback resolver.
    ///
    /// `CNF_SYSTEM_DIRS` (a `PATH`-style list) replaces
    /// [`SYSTEM_DIRECTORIES`] when set.
    pub fn from_env() -> Self {
        let system_dirs = match env_non_empty(SYSTEM_DIRS_ENV) {
            Some(raw) => env::split_paths(&raw).collect(),
            None => SYSTEM_DIRECTORIES.iter().map(PathBuf::from).collect(),
        };
        Self {
            search_path: env::var_os("PATH"),
            system_dirs,
            resolver: Some(CommandSpec::new(DEFAULT_RESOLVER, Vec::<OsString>::new())),
        }
    }

    pub fn new(
        search_path: Option<OsString>,
        system_dirs: Vec<PathBuf>,
        resolver: Option<CommandSpec>,
    ) -> Self {
        Self {
            search_path,
            system_dirs,
            resolver,
        }
    }
}

impl Prober for HostProber {
    fn on_search_path(&self, name: &OsStr) -> bool {
        find_on_path(name, self.search_path.as_deref()).is_some()
    }

    fn system_location(&self, name: &OsStr) -> Option<PathBuf> {
        if let Some(found) = locate_in_dirs(name, &self.system_dirs) {
            return Some(found);
        }
        let resolver = self.resolver.as_ref()?;
        resolve_with_utility(resolver, name)
    }
}

/// Whether `name` is executable from the current process's `PATH`.
pub fn exists_on_search_path(name: &OsStr) -> bool {
    let path = env::var_os("PATH");
    find_on_path(name, path.as_deref()).is_some()
}

/// Whether `name` is present in one of [`SYSTEM_DIRECTORIES`], or known to
/// the fallback resolver.
pub fn exists_in_system_directories(name: &OsStr) -> bool {
    locate_in_system_directories(name).is_some()
}

pub fn locate_in_system_directories(name: &OsStr) -> Option<PathBuf> {
    HostProber::from_env().system_location(name)
}

/// First executable `<dir>/<name>` along `search_path`.
pub fn find_on_path(name: &OsStr, search_path: Option<&OsStr>) -> Option<PathBuf> {
    if !is_plain_name(name) {
        return None;
    }
    let paths = search_path?;
    for dir in env::split_paths(paths) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// First existing `<dir>/<name>`; executability is not required.
pub fn locate_in_dirs(name: &OsStr, dirs: &[PathBuf]) -> Option<PathBuf> {
    if !is_plain_name(name) {
        return None;
    }
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.exists())
}

/// Regular file the current user may execute.
pub fn is_executable(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;
        let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
            return false;
        };
        // SAFETY: c_path is a valid NUL-terminated string for the call.
        unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}

fn resolve_with_utility(resolver: &CommandSpec, name: &OsStr) -> Option<PathBuf> {
    let stdout = match resolver.stdout(&[name]) {
        Ok(stdout) => stdout,
        Err(err) => {
            debug!("path resolver gave no answer: {err:#}");
            return None;
        }
    };
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(PathBuf::from)
}

// A name with a separator would escape the directory being probed.
fn is_plain_name(name: &OsStr) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    !name.to_string_lossy().contains('/')
}
