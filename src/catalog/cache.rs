//! On-disk snapshot of package metadata.
//!
//! The snapshot is derived data: it can be deleted or regenerated at any
//! time without affecting correctness, only freshness. The file's
//! modification time is the staleness clock. Regeneration is synchronous and
//! writes through a temporary sibling that is renamed into place, so two
//! helpers racing on a rebuild leave whichever snapshot finished last and
//! readers never observe a half-written file.

use anyhow::{Context, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Snapshots older than this are regenerated before use.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24);

#[derive(Clone, Debug)]
pub struct MetadataCache {
    path: PathBuf,
    max_age: Duration,
}

impl MetadataCache {
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            path: path.into(),
            max_age,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Age of the snapshot at `now`, or `None` when it does not exist.
    ///
    /// A modification time in the future counts as age zero.
    pub fn age_at(&self, now: SystemTime) -> Option<Duration> {
        let modified = fs::metadata(&self.path).ok()?.modified().ok()?;
        Some(now.duration_since(modified).unwrap_or(Duration::ZERO))
    }

    pub fn is_stale_at(&self, now: SystemTime) -> bool {
        match self.age_at(now) {
            Some(age) => age > self.max_age,
            None => true,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(SystemTime::now())
    }

    /// Regenerate the snapshot when it is missing or stale.
    ///
    /// Returns whether a regeneration happened.
    pub fn ensure_fresh<F>(&self, regenerate: F) -> Result<bool>
    where
        F: FnOnce() -> Result<String>,
    {
        if !self.is_stale() {
            debug!(path = %self.path.display(), "metadata cache is fresh");
            return Ok(false);
        }
        info!(path = %self.path.display(), "metadata cache missing or stale; regenerating");
        let contents = regenerate()?;
        self.write(&contents)?;
        Ok(true)
    }

    /// Drop the snapshot and regenerate it unconditionally.
    pub fn rebuild<F>(&self, regenerate: F) -> Result<()>
    where
        F: FnOnce() -> Result<String>,
    {
        self.invalidate()?;
        let contents = regenerate()?;
        self.write(&contents)
    }

    /// Remove the snapshot; a missing file is not an error.
    pub fn invalidate(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("removing cache {}", self.path.display()))
            }
        }
    }

    pub fn read(&self) -> Result<String> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("reading cache {}", self.path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn write(&self, contents: &str) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating cache directory {}", dir.display()))?;
        let mut staged = NamedTempFile::new_in(&dir)
            .with_context(|| format!("staging cache in {}", dir.display()))?;
        staged
            .write_all(contents.as_bytes())
            .with_context(|| format!("writing staged cache for {}", self.path.display()))?;
        staged
            .persist(&self.path)
            .with_context(|| format!("installing cache {}", self.path.display()))?;
        Ok(())
    }
}
