//! Suggestion-resolution pipeline.
//!
//! One call turns the string the shell could not resolve into an
//! [`Outcome`]: either a command to execute in place of the helper, or a
//! [`Report`] describing what is known about the missing command. The
//! pipeline never executes anything and never prints; the binary does both.

use crate::MAX_INPUT_LEN;
use crate::catalog::{CatalogQuery, PackageRecord, PackageStore};
use crate::layout::{UnmappedPolicy, transliterate_with};
use crate::probe::Prober;
use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Rejections that stop the pipeline before any probing happens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputError {
    Empty,
    TooLong { len: usize },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => write!(f, "no command given"),
            InputError::TooLong { len } => {
                write!(f, "command is {len} bytes long; the limit is {MAX_INPUT_LEN}")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// The typed command and its keyboard-layout correction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandCandidate {
    pub original: String,
    pub corrected: OsString,
}

impl CommandCandidate {
    /// Validate the raw argument and compute its correction.
    pub fn new(raw: &str, policy: UnmappedPolicy) -> Result<Self, InputError> {
        if raw.is_empty() {
            return Err(InputError::Empty);
        }
        if raw.len() > MAX_INPUT_LEN {
            return Err(InputError::TooLong { len: raw.len() });
        }
        Ok(Self {
            original: raw.to_string(),
            corrected: transliterate_with(raw, policy),
        })
    }

    pub fn was_corrected(&self) -> bool {
        self.corrected.as_os_str() != OsStr::new(&self.original)
    }

    pub fn corrected_lossy(&self) -> String {
        self.corrected.to_string_lossy().into_owned()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Replace the helper with this command.
    Execute(ExecPlan),
    /// Nothing runnable; report what is known.
    NotFound(Report),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecPlan {
    #[serde(skip)]
    pub program: OsString,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocorrected_from: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OwnerSuggestion {
    pub package: PackageRecord,
    pub installed: bool,
}

/// A command present in a system directory but not runnable from `PATH`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SystemHit {
    /// The candidate that was found: the typed name or its correction.
    pub name: String,
    pub path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Report {
    /// What the user typed.
    pub command: String,
    /// Layout correction, when it differs from the input and is not runnable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub did_you_mean: Option<String>,
    /// Name used for package lookups.
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_location: Option<SystemHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSuggestion>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub similar: Vec<PackageRecord>,
}

impl Report {
    /// No suggestion beyond a manual search.
    pub fn is_bare(&self) -> bool {
        self.system_location.is_none() && self.owner.is_none() && self.similar.is_empty()
    }
}

pub struct Pipeline<'a, P, Q> {
    prober: &'a P,
    store: &'a PackageStore<Q>,
    policy: UnmappedPolicy,
    max_results: usize,
}

impl<'a, P: Prober, Q: CatalogQuery> Pipeline<'a, P, Q> {
    pub fn new(
        prober: &'a P,
        store: &'a PackageStore<Q>,
        policy: UnmappedPolicy,
        max_results: usize,
    ) -> Self {
        Self {
            prober,
            store,
            policy,
            max_results,
        }
    }

    pub fn resolve(&self, raw: &str) -> Result<Outcome, InputError> {
        let candidate = CommandCandidate::new(raw, self.policy)?;
        Ok(self.resolve_candidate(&candidate))
    }

    pub fn resolve_candidate(&self, candidate: &CommandCandidate) -> Outcome {
        let corrected = candidate.was_corrected();

        if corrected && self.prober.on_search_path(&candidate.corrected) {
            info!(
                from = %candidate.original,
                to = %candidate.corrected_lossy(),
                "auto-correcting keyboard layout"
            );
            return Outcome::Execute(ExecPlan {
                program: candidate.corrected.clone(),
                command: candidate.corrected_lossy(),
                autocorrected_from: Some(candidate.original.clone()),
            });
        }

        if self.prober.on_search_path(OsStr::new(&candidate.original)) {
            return Outcome::Execute(ExecPlan {
                program: OsString::from(&candidate.original),
                command: candidate.original.clone(),
                autocorrected_from: None,
            });
        }

        let mut report = Report {
            command: candidate.original.clone(),
            did_you_mean: corrected.then(|| candidate.corrected_lossy()),
            query: candidate.corrected_lossy(),
            system_location: None,
            owner: None,
            similar: Vec::new(),
        };

        report.system_location = self.locate(candidate, corrected);
        if let Some(hit) = &report.system_location {
            debug!(location = %hit.path.display(), "installed outside the search path");
            return Outcome::NotFound(report);
        }

        let index = self.store.index_or_empty();
        if let Some(package) = index.find_owner(&report.query) {
            let installed = self.store.is_installed(&package.name);
            debug!(package = %package.name, installed, "found owner package");
            report.owner = Some(OwnerSuggestion { package, installed });
        } else {
            report.similar = index.find_similar(&report.query, self.max_results);
            debug!(matches = report.similar.len(), "ranked similar packages");
        }

        Outcome::NotFound(report)
    }

    /// System-tier lookup for the typed name, then for its correction.
    fn locate(&self, candidate: &CommandCandidate, corrected: bool) -> Option<SystemHit> {
        if let Some(path) = self.prober.system_location(OsStr::new(&candidate.original)) {
            return Some(SystemHit {
                name: candidate.original.clone(),
                path,
            });
        }
        if !corrected {
            return None;
        }
        let path = self.prober.system_location(&candidate.corrected)?;
        Some(SystemHit {
            name: candidate.corrected_lossy(),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn candidate_validates_length_in_bytes() {
        assert_eq!(
            CommandCandidate::new("", UnmappedPolicy::Passthrough),
            Err(InputError::Empty)
        );
        let at_limit = "a".repeat(MAX_INPUT_LEN);
        assert!(CommandCandidate::new(&at_limit, UnmappedPolicy::Passthrough).is_ok());
        let over = "д".repeat(51);
        assert_eq!(
            CommandCandidate::new(&over, UnmappedPolicy::Passthrough),
            Err(InputError::TooLong { len: 102 })
        );
    }

    #[test]
    fn candidate_tracks_correction() {
        let typed = CommandCandidate::new("ды", UnmappedPolicy::Passthrough).unwrap();
        assert!(typed.was_corrected());
        assert_eq!(typed.corrected_lossy(), "ls");
        let plain = CommandCandidate::new("ls", UnmappedPolicy::Passthrough).unwrap();
        assert!(!plain.was_corrected());
    }

    struct SbinOnly(&'static str);

    impl Prober for SbinOnly {
        fn on_search_path(&self, _name: &OsStr) -> bool {
            false
        }

        fn system_location(&self, name: &OsStr) -> Option<PathBuf> {
            (name == self.0).then(|| PathBuf::from("/usr/sbin").join(name))
        }
    }

    #[test]
    fn system_hit_names_the_candidate_that_was_found() {
        let temp = tempfile::TempDir::new().unwrap();
        let store = PackageStore::flat(
            crate::catalog::MetadataCache::new(temp.path().join("packages.txt"), Duration::ZERO),
            crate::catalog::SystemCatalogQuery::default(),
        );
        let prober = SbinOnly("disk");
        let pipeline = Pipeline::new(&prober, &store, UnmappedPolicy::Passthrough, 3);

        let Outcome::NotFound(report) = pipeline.resolve("вшыл").unwrap() else {
            panic!("expected a report");
        };
        let hit = report.system_location.expect("system hit");
        assert_eq!(hit.name, "disk");
        assert_eq!(hit.path, PathBuf::from("/usr/sbin/disk"));
        assert_eq!(report.command, "вшыл");
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let outcome = Outcome::Execute(ExecPlan {
            program: OsString::from("ls"),
            command: "ls".to_string(),
            autocorrected_from: Some("ды".to_string()),
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], "execute");
        assert_eq!(value["command"], "ls");
        assert_eq!(value["autocorrected_from"], "ды");
        assert!(value.get("program").is_none());
    }
}
