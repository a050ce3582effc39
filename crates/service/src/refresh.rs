//! Offline batch run: fetch, normalize, aggregate, commit.

use chrono::{DateTime, Utc};
use modrank_client::{CatalogSource, fetch_all};
use modrank_core::{
    CatalogFilter, CreatorsSnapshot, FilterConfig, ItemsSnapshot, RawCatalogEntry,
    aggregate_creators, normalize_catalog,
};
use serde::Serialize;

use crate::error::RefreshError;
use crate::store::SnapshotStore;

/// Counts from a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub generated_at: DateTime<Utc>,
    /// Raw entries the run started from.
    pub fetched: usize,
    pub items: usize,
    pub creators: usize,
}

/// Build both snapshots from raw entries. Pure; nothing is written.
#[must_use]
pub fn build_snapshots(
    entries: &[RawCatalogEntry],
    filter: &CatalogFilter,
    now: DateTime<Utc>,
) -> (ItemsSnapshot, CreatorsSnapshot) {
    let items = normalize_catalog(entries, filter, now);
    let creators = aggregate_creators(&items, now);
    (
        ItemsSnapshot { generated_at: now, items },
        CreatorsSnapshot { generated_at: now, creators },
    )
}

/// Runs the batch pipeline against a [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct Refresher {
    store: SnapshotStore,
    filter: CatalogFilter,
}

impl Refresher {
    /// # Errors
    /// Returns [`RefreshError::Filter`] if an excluded-link pattern is invalid.
    pub fn new(store: SnapshotStore, filter: &FilterConfig) -> Result<Self, RefreshError> {
        Ok(Self { store, filter: CatalogFilter::new(filter)? })
    }

    #[must_use]
    pub const fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Fetch the full catalog and write the raw dump. Returns the entry count.
    ///
    /// # Errors
    /// Returns [`RefreshError::Fetch`] on upstream failure, or a write error.
    pub async fn fetch<S>(
        &self,
        source: &S,
        page_size: usize,
        max_results: Option<usize>,
    ) -> Result<usize, RefreshError>
    where
        S: CatalogSource + ?Sized,
    {
        let entries = fetch_all(source, page_size, max_results).await?;
        self.store.write_raw_catalog(&entries).await?;
        tracing::info!(
            count = entries.len(),
            path = %self.store.raw_catalog_path().display(),
            "wrote raw catalog"
        );
        Ok(entries.len())
    }

    /// Build snapshots from the raw dump written by [`Refresher::fetch`].
    ///
    /// # Errors
    /// Returns [`RefreshError::MissingRaw`] when no dump exists, or any
    /// error from [`Refresher::process_entries`].
    pub async fn process(&self, now: DateTime<Utc>) -> Result<RefreshReport, RefreshError> {
        let entries = self.store.read_raw_catalog().await?;
        self.process_entries(&entries, now).await
    }

    /// Normalize, aggregate and commit `entries`.
    ///
    /// # Errors
    /// Returns a serialization or write error; prior snapshots are untouched
    /// unless both new ones were staged.
    pub async fn process_entries(
        &self,
        entries: &[RawCatalogEntry],
        now: DateTime<Utc>,
    ) -> Result<RefreshReport, RefreshError> {
        let (items, creators) = build_snapshots(entries, &self.filter, now);
        self.store.commit_snapshots(&items, &creators).await?;
        let report = RefreshReport {
            generated_at: now,
            fetched: entries.len(),
            items: items.items.len(),
            creators: creators.creators.len(),
        };
        tracing::info!(
            fetched = report.fetched,
            items = report.items,
            creators = report.creators,
            "refresh complete"
        );
        Ok(report)
    }

    /// Fetch, write the raw dump, then process.
    ///
    /// # Errors
    /// Any fetch, serialization or write error. A fetch failure leaves both
    /// the raw dump and the snapshots as they were.
    pub async fn refresh<S>(
        &self,
        source: &S,
        page_size: usize,
        max_results: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<RefreshReport, RefreshError>
    where
        S: CatalogSource + ?Sized,
    {
        let entries = fetch_all(source, page_size, max_results).await?;
        self.store.write_raw_catalog(&entries).await?;
        self.process_entries(&entries, now).await
    }
}
