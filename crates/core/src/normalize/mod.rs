//! Catalog normalization: raw upstream entries into [`ItemRecord`]s.

mod filter;
mod raw;

pub use filter::{CatalogFilter, FilterConfig};
pub use raw::{CREATED_AT_FIELDS, RawCatalogEntry};

use chrono::{DateTime, Utc};

use crate::age::{age_or_default, rate, round2};
use crate::record::ItemRecord;

/// Keep the entries `filter` accepts and project them, preserving input order.
#[must_use]
pub fn normalize_catalog(
    entries: &[RawCatalogEntry],
    filter: &CatalogFilter,
    now: DateTime<Utc>,
) -> Vec<ItemRecord> {
    let items: Vec<ItemRecord> = entries
        .iter()
        .filter(|entry| filter.accepts(entry))
        .map(|entry| project_entry(entry, now))
        .collect();
    tracing::debug!(input = entries.len(), kept = items.len(), "normalized catalog");
    items
}

/// Project a single entry into an item record.
#[must_use]
pub fn project_entry(entry: &RawCatalogEntry, now: DateTime<Utc>) -> ItemRecord {
    let authors = entry.author_names();
    let download_count = entry.download_count();
    let created_at = entry.created_at().map(str::to_owned);
    let age = age_or_default(created_at.as_deref(), now);

    ItemRecord {
        id: entry.id(),
        name: entry.name().unwrap_or_default().to_owned(),
        author: authors.first().cloned(),
        authors,
        download_count,
        download_rate: rate(download_count, age),
        created_at,
        days_existing: round2(age),
    }
}
