//! Shell "command not found" helper.
//!
//! The shell hands us the name it failed to resolve. We undo a Cyrillic
//! keyboard-layout slip, look for the command on `PATH` and in the system
//! directories, then consult the package catalog for the owning package or
//! close matches.

pub mod catalog;
pub mod config;
pub mod connectors;
pub mod i18n;
pub mod layout;
pub mod pipeline;
pub mod probe;
pub mod render;

pub use catalog::{
    CatalogIndex, CatalogQuery, MetadataCache, PackageRecord, PackageStore, SystemCatalogQuery,
};
pub use config::Settings;
pub use connectors::{Backend, CommandSpec};
pub use i18n::{MessageCatalog, Translator, Untranslated};
pub use layout::{UnmappedPolicy, transliterate};
pub use pipeline::{
    CommandCandidate, ExecPlan, InputError, Outcome, Pipeline, Report, SystemHit,
};
pub use probe::{HostProber, Prober};
pub use render::{Hints, render_json, render_text};

/// Longest accepted command, in bytes.
pub const MAX_INPUT_LEN: usize = 100;

/// Shell convention for "command not found".
pub const EXIT_NOT_FOUND: i32 = 127;
pub const EXIT_FAILURE: i32 = 1;

/// Exit status for `outcome` when it is reported instead of executed.
pub fn exit_code(outcome: &Outcome) -> i32 {
    match outcome {
        Outcome::Execute(_) => 0,
        Outcome::NotFound(_) => EXIT_NOT_FOUND,
    }
}
