//! Search and window over a ranked population.

use crate::rank::{RankedEntry, Ranking};
use crate::record::Rankable;

/// The entries visible in the current view, static ranks intact.
#[derive(Debug)]
pub struct Window<'a, R> {
    entries: Vec<RankedEntry<'a, R>>,
    matched: usize,
}

impl<'a, R> Window<'a, R> {
    #[must_use]
    pub fn entries(&self) -> &[RankedEntry<'a, R>] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that matched the search before truncation.
    #[must_use]
    pub const fn matched(&self) -> usize {
        self.matched
    }
}

/// Clamp a requested window size into `[1, available]`.
///
/// With nothing available the window is empty regardless of the request.
#[must_use]
pub fn clamp_window(requested: usize, available: usize) -> usize {
    if available == 0 {
        return 0;
    }
    requested.clamp(1, available)
}

/// Whether `record` matches a lower-cased, trimmed, non-empty needle.
fn matches_query<R: Rankable>(record: &R, needle: &str) -> bool {
    record.display_name().to_lowercase().contains(needle)
        || record.primary_creator().is_some_and(|c| c.to_lowercase().contains(needle))
}

/// Apply a case-insensitive search and a window to a ranking.
///
/// Blank queries match everything. The window is clamped into
/// `[1, matched]` before truncation, so out-of-range requests are coerced
/// rather than rejected.
#[must_use]
pub fn apply_view_filter<'a, R: Rankable>(
    ranking: Ranking<'a, R>,
    query: &str,
    max_entries: usize,
) -> Window<'a, R> {
    let needle = query.trim().to_lowercase();
    let mut entries = ranking.into_entries();
    if !needle.is_empty() {
        entries.retain(|entry| matches_query(entry.record, &needle));
    }
    let matched = entries.len();
    entries.truncate(clamp_window(max_entries, matched));
    Window { entries, matched }
}
