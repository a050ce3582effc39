//! Ranking engine.
//!
//! Ranks are assigned over the whole population before any search or window
//! is applied. [`Ranking`] is the only way to obtain [`RankedEntry`] values,
//! and the view filter consumes it, so a filtered view cannot be re-ranked.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::CoreError;
use crate::record::{FieldValue, Rankable};

/// User-facing sort keys and the record fields they resolve to.
///
/// Keys missing from this table are used verbatim as field names, so any
/// serialized record field can be sorted on.
pub const SORT_KEY_ALIASES: &[(&str, &str)] = &[
    ("downloads", "downloadCount"),
    ("downloadsRate", "downloadRate"),
    ("mods", "itemCount"),
    ("name", "name"),
    ("time", "daysExisting"),
];

/// Sort key used when none is given.
pub const DEFAULT_SORT_KEY: &str = "downloads";

/// Resolve a user-facing sort key to the record field it reads.
#[must_use]
pub fn resolve_sort_field(key: &str) -> &str {
    SORT_KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map_or(key, |(_, field)| *field)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[default]
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(CoreError::InvalidInput(format!("unknown sort direction: {other}"))),
        }
    }
}

/// A population member with its static rank.
#[derive(Debug)]
pub struct RankedEntry<'a, R> {
    /// 1-based position in the full, unfiltered sort order.
    pub rank: usize,
    pub record: &'a R,
}

impl<R> Clone for RankedEntry<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for RankedEntry<'_, R> {}

/// The full population in sort order.
#[derive(Debug)]
pub struct Ranking<'a, R> {
    entries: Vec<RankedEntry<'a, R>>,
}

impl<'a, R> Ranking<'a, R> {
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

    pub(crate) fn into_entries(self) -> Vec<RankedEntry<'a, R>> {
        self.entries
    }
}

enum SortValue<'a> {
    Number(f64),
    Text { folded: String, raw: &'a str },
}

impl SortValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text { folded: fa, raw: ra }, Self::Text { folded: fb, raw: rb }) => {
                fa.cmp(fb).then_with(|| ra.cmp(rb))
            },
            (Self::Number(_), Self::Text { .. }) => Ordering::Less,
            (Self::Text { .. }, Self::Number(_)) => Ordering::Greater,
        }
    }
}

fn sort_value<'a, R: Rankable>(record: &'a R, field: &str) -> SortValue<'a> {
    match record.field(field) {
        Some(FieldValue::Text(raw)) => SortValue::Text { folded: collation_key(raw), raw },
        Some(FieldValue::Number(n)) => SortValue::Number(n),
        None => SortValue::Number(0.0),
    }
}

/// Accent- and case-insensitive key approximating locale-aware ordering.
#[must_use]
pub fn collation_key(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Locale-aware comparison: folded order first, exact order as tiebreak.
#[must_use]
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a).cmp(&collation_key(b)).then_with(|| a.cmp(b))
}

/// Rank the whole population by `sort_key` in `direction`.
///
/// The sort is stable in both directions: records comparing equal keep their
/// input order, and that order decides their relative rank.
#[must_use]
pub fn rank_population<'a, R: Rankable>(
    population: &'a [R],
    sort_key: &str,
    direction: SortDirection,
) -> Ranking<'a, R> {
    let field = resolve_sort_field(sort_key);
    let mut keyed: Vec<(SortValue<'a>, &'a R)> =
        population.iter().map(|record| (sort_value(record, field), record)).collect();

    keyed.sort_by(|(a, _), (b, _)| match direction {
        SortDirection::Ascending => a.compare(b),
        SortDirection::Descending => b.compare(a),
    });

    let entries = keyed
        .into_iter()
        .enumerate()
        .map(|(idx, (_, record))| RankedEntry { rank: idx + 1, record })
        .collect();
    Ranking { entries }
}
