//! Owner and similarity matching over parsed catalog data.
//!
//! Everything here is pure: callers hand in snapshot text or records and get
//! a deterministic answer back, which keeps the ranking rules testable
//! without any external tools.

use crate::catalog::PackageRecord;
use std::collections::BTreeMap;

/// Number of near matches presented to the user.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Scan a flat catalog snapshot for the package named exactly `command`.
///
/// A line matches when it starts with `command` and the next character is a
/// word boundary (space, tab, newline, or end of line), so `ls` never
/// matches `lsof`.
pub fn find_owner_in_catalog(snapshot: &str, command: &str) -> Option<PackageRecord> {
    if command.is_empty() {
        return None;
    }
    snapshot
        .lines()
        .filter(|line| starts_with_word(line, command))
        .filter_map(PackageRecord::from_catalog_line)
        .find(|record| record.name == command)
}

/// First ownership record whose path's file name equals `command`.
///
/// Order is the caller's iteration order; the store feeds manifests sorted by
/// file name so the result is stable for a given snapshot.
pub fn find_owner_in_ownership<'a, I>(records: I, command: &str) -> Option<PackageRecord>
where
    I: IntoIterator<Item = &'a PackageRecord>,
{
    if command.is_empty() {
        return None;
    }
    records
        .into_iter()
        .find(|record| {
            record
                .path
                .as_deref()
                .map(file_name_of)
                .is_some_and(|name| name == command)
        })
        .cloned()
}

/// Packages whose name contains `pattern`, shortest and then alphabetically
/// first, at most `max_results` of them.
///
/// Duplicate names keep their first record.
pub fn rank_similar<'a, I>(records: I, pattern: &str, max_results: usize) -> Vec<PackageRecord>
where
    I: IntoIterator<Item = &'a PackageRecord>,
{
    if pattern.is_empty() || max_results == 0 {
        return Vec::new();
    }
    let mut distinct: BTreeMap<&str, &PackageRecord> = BTreeMap::new();
    for record in records {
        if record.name.contains(pattern) {
            distinct.entry(record.name.as_str()).or_insert(record);
        }
    }
    let mut ranked: Vec<&PackageRecord> = distinct.into_values().collect();
    ranked.sort_by(|a, b| {
        a.name
            .len()
            .cmp(&b.name.len())
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.into_iter().take(max_results).cloned().collect()
}

fn starts_with_word(line: &str, word: &str) -> bool {
    match line.strip_prefix(word) {
        Some(rest) => rest.is_empty() || rest.starts_with([' ', '\t', '\n', '\r']),
        None => false,
    }
}

fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
