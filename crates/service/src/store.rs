//! On-disk snapshot store.
//!
//! Layout under the data directory:
//! - `items.json`, `creators.json`: the two snapshots (legacy `mods.json` and
//!   `authors.json` are still read when the new names are absent)
//! - `catalog.json`: the raw upstream dump written by `fetch`

use std::io;
use std::path::{Path, PathBuf};

use modrank_core::{
    CreatorsSnapshot, ItemsSnapshot, PopulationKind, RawCatalogEntry, Snapshot, env_string,
};

use crate::error::{RefreshError, SnapshotError};

const DATA_DIR_ENV: &str = "MODRANK_DATA_DIR";
/// Data directory used when `MODRANK_DATA_DIR` is unset.
pub const DEFAULT_DATA_DIR: &str = "./data";
/// File name of the raw catalog dump.
pub const RAW_CATALOG_FILE: &str = "catalog.json";

/// Current file name for a population's snapshot.
#[must_use]
pub const fn snapshot_file_name(kind: PopulationKind) -> &'static str {
    match kind {
        PopulationKind::Items => "items.json",
        PopulationKind::Creators => "creators.json",
    }
}

/// Legacy file name for a population's snapshot.
#[must_use]
pub const fn legacy_snapshot_file_name(kind: PopulationKind) -> &'static str {
    match kind {
        PopulationKind::Items => "mods.json",
        PopulationKind::Creators => "authors.json",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    /// Store rooted at `MODRANK_DATA_DIR`, or `./data`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(env_string(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned()))
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn snapshot_path(&self, kind: PopulationKind) -> PathBuf {
        self.data_dir.join(snapshot_file_name(kind))
    }

    #[must_use]
    pub fn raw_catalog_path(&self) -> PathBuf {
        self.data_dir.join(RAW_CATALOG_FILE)
    }

    /// Path of the snapshot file to read: the current name if it exists,
    /// else the legacy name if that exists.
    pub async fn existing_snapshot_path(&self, kind: PopulationKind) -> Option<PathBuf> {
        let current = self.snapshot_path(kind);
        if tokio::fs::try_exists(&current).await.unwrap_or(false) {
            return Some(current);
        }
        let legacy = self.data_dir.join(legacy_snapshot_file_name(kind));
        tokio::fs::try_exists(&legacy).await.unwrap_or(false).then_some(legacy)
    }

    /// Raw bytes of a snapshot file, for serving verbatim.
    ///
    /// # Errors
    /// [`SnapshotError::Missing`] when neither file name exists, or
    /// [`SnapshotError::Io`] if the read fails.
    pub async fn read_snapshot_bytes(&self, kind: PopulationKind) -> Result<Vec<u8>, SnapshotError> {
        let Some(path) = self.existing_snapshot_path(kind).await else {
            return Err(SnapshotError::Missing { path: self.snapshot_path(kind) });
        };
        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SnapshotError::Missing { path: path.clone() }
            } else {
                SnapshotError::Io { path: path.clone(), source }
            }
        })
    }

    /// Read and decode the snapshot for `kind`.
    ///
    /// # Errors
    /// See [`SnapshotStore::read_snapshot_bytes`]; additionally
    /// [`SnapshotError::UnrecognizedShape`] for undecodable documents or a
    /// document holding the other population.
    pub async fn load_snapshot(&self, kind: PopulationKind) -> Result<Snapshot, SnapshotError> {
        let bytes = self.read_snapshot_bytes(kind).await?;
        expect_kind(Snapshot::from_slice(&bytes)?, kind)
    }

    /// Write the raw catalog dump.
    ///
    /// # Errors
    /// Returns [`RefreshError::Io`] or [`RefreshError::Serialization`].
    pub async fn write_raw_catalog(&self, entries: &[RawCatalogEntry]) -> Result<(), RefreshError> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        let path = self.raw_catalog_path();
        self.ensure_dir().await?;
        write_atomically(&path, &bytes).await
    }

    /// Read the raw catalog dump.
    ///
    /// # Errors
    /// [`RefreshError::MissingRaw`] if no dump exists, [`RefreshError::InvalidRaw`]
    /// if it is not a JSON array.
    pub async fn read_raw_catalog(&self) -> Result<Vec<RawCatalogEntry>, RefreshError> {
        let path = self.raw_catalog_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RefreshError::MissingRaw { path });
            },
            Err(source) => return Err(RefreshError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| RefreshError::InvalidRaw { path, source })
    }

    /// Replace both snapshots.
    ///
    /// Both documents are serialized and written to temp files before either
    /// live file is touched. The live items file is copied aside first; if the
    /// creators rename then fails, items are restored from that copy, so the
    /// previous pair stays in place on any failure.
    ///
    /// # Errors
    /// Returns [`RefreshError::Serialization`] or [`RefreshError::Io`].
    pub async fn commit_snapshots(
        &self,
        items: &ItemsSnapshot,
        creators: &CreatorsSnapshot,
    ) -> Result<(), RefreshError> {
        let items_bytes = serde_json::to_vec_pretty(items)?;
        let creators_bytes = serde_json::to_vec_pretty(creators)?;
        self.ensure_dir().await?;

        let items_path = self.snapshot_path(PopulationKind::Items);
        let creators_path = self.snapshot_path(PopulationKind::Creators);
        let items_tmp = temp_path(&items_path);
        let creators_tmp = temp_path(&creators_path);

        let staged = async {
            write_file(&items_tmp, &items_bytes).await?;
            write_file(&creators_tmp, &creators_bytes).await
        };
        if let Err(e) = staged.await {
            discard(&items_tmp).await;
            discard(&creators_tmp).await;
            return Err(e);
        }

        let items_backup = backup_path(&items_path);
        let had_items = match tokio::fs::copy(&items_path, &items_backup).await {
            Ok(_) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(source) => {
                discard(&items_tmp).await;
                discard(&creators_tmp).await;
                return Err(RefreshError::Io { path: items_backup, source });
            },
        };

        if let Err(e) = rename(&items_tmp, &items_path).await {
            discard(&items_tmp).await;
            discard(&creators_tmp).await;
            discard(&items_backup).await;
            return Err(e);
        }
        if let Err(e) = rename(&creators_tmp, &creators_path).await {
            discard(&creators_tmp).await;
            restore(&items_path, &items_backup, had_items).await;
            return Err(e);
        }
        discard(&items_backup).await;
        tracing::info!(
            items = items.items.len(),
            creators = creators.creators.len(),
            dir = %self.data_dir.display(),
            "committed snapshots"
        );
        Ok(())
    }

    async fn ensure_dir(&self) -> Result<(), RefreshError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| RefreshError::Io { path: self.data_dir.clone(), source })
    }
}

/// Reject a snapshot that decoded as a population other than `kind`.
pub(crate) fn expect_kind(
    snapshot: Snapshot,
    kind: PopulationKind,
) -> Result<Snapshot, SnapshotError> {
    let found = snapshot.population.kind();
    if found == kind {
        return Ok(snapshot);
    }
    tracing::warn!(requested = %kind, %found, "snapshot holds a different population");
    Err(SnapshotError::UnrecognizedShape(format!("expected {kind} snapshot, found {found}")))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".bak");
    path.with_file_name(name)
}

/// Put `live` back the way it was before a failed commit: the backup copy if
/// there was a previous file, otherwise nothing.
async fn restore(live: &Path, backup: &Path, had_previous: bool) {
    if !had_previous {
        discard(live).await;
        return;
    }
    if let Err(e) = tokio::fs::rename(backup, live).await {
        tracing::error!(
            path = %live.display(),
            backup = %backup.display(),
            error = %e,
            "failed to restore snapshot after aborted commit"
        );
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), RefreshError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| RefreshError::Io { path: path.to_path_buf(), source })
}

async fn rename(from: &Path, to: &Path) -> Result<(), RefreshError> {
    tokio::fs::rename(from, to)
        .await
        .map_err(|source| RefreshError::Io { path: to.to_path_buf(), source })
}

async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), RefreshError> {
    let tmp = temp_path(path);
    write_file(&tmp, bytes).await?;
    rename(&tmp, path).await
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
        },
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use modrank_core::{CreatorSummary, ItemRecord, Population};

    use super::*;

    fn snapshots() -> (ItemsSnapshot, CreatorsSnapshot) {
        let generated_at = Utc.with_ymd_and_hms(2024, 1, 21, 0, 0, 0).single().expect("time");
        let item = ItemRecord {
            id: Some(1),
            name: "Create Deco".to_owned(),
            author: Some("Orion".to_owned()),
            authors: vec!["Orion".to_owned()],
            download_count: 100,
            download_rate: 10.0,
            created_at: None,
            days_existing: 10.0,
        };
        let creator = CreatorSummary {
            name: "Orion".to_owned(),
            download_count: 100,
            item_count: 1,
            download_rate: 10.0,
            days_existing: 10.0,
        };
        (
            ItemsSnapshot { generated_at, items: vec![item] },
            CreatorsSnapshot { generated_at, creators: vec![creator] },
        )
    }

    #[tokio::test]
    async fn commit_then_load_both_kinds() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path().join("data"));
        let (items, creators) = snapshots();
        store.commit_snapshots(&items, &creators).await.expect("commit");

        let loaded = store.load_snapshot(PopulationKind::Items).await.expect("items");
        assert_eq!(loaded.population, Population::Items(items.items));
        let loaded = store.load_snapshot(PopulationKind::Creators).await.expect("creators");
        assert_eq!(loaded.population.len(), 1);
        assert!(!temp_path(&store.snapshot_path(PopulationKind::Items)).exists());
    }

    #[tokio::test]
    async fn missing_snapshot_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let err = store.load_snapshot(PopulationKind::Items).await.expect_err("missing");
        assert!(matches!(err, SnapshotError::Missing { .. }));
    }

    #[tokio::test]
    async fn legacy_file_name_is_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("authors.json"),
            r#"{"generatedAt":"2024-01-21T00:00:00Z","authors":[{"name":"Orion","downloadCount":5,"mods":1}]}"#,
        )
        .expect("write");
        let store = SnapshotStore::new(dir.path());
        let snapshot = store.load_snapshot(PopulationKind::Creators).await.expect("legacy");
        assert_eq!(snapshot.population.kind(), PopulationKind::Creators);
    }

    #[tokio::test]
    async fn garbage_snapshot_is_unrecognized() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("items.json"), r#"{"rows":[]}"#).expect("write");
        let store = SnapshotStore::new(dir.path());
        let err = store.load_snapshot(PopulationKind::Items).await.expect_err("shape");
        assert!(matches!(err, SnapshotError::UnrecognizedShape(_)));
    }

    #[tokio::test]
    async fn snapshot_of_other_population_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("items.json"),
            r#"{"generatedAt":"2024-01-21T00:00:00Z","creators":[{"name":"Orion"}]}"#,
        )
        .expect("write");
        let store = SnapshotStore::new(dir.path());
        let err = store.load_snapshot(PopulationKind::Items).await.expect_err("wrong kind");
        let SnapshotError::UnrecognizedShape(message) = err else {
            panic!("expected shape error");
        };
        assert!(message.contains("found creators"), "{message}");
    }

    #[tokio::test]
    async fn raw_catalog_round_trips_and_reports_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        assert!(matches!(store.read_raw_catalog().await, Err(RefreshError::MissingRaw { .. })));

        let entries = vec![RawCatalogEntry(serde_json::json!({ "id": 7, "name": "Create X" }))];
        store.write_raw_catalog(&entries).await.expect("write");
        assert_eq!(store.read_raw_catalog().await.expect("read"), entries);
    }

    #[tokio::test]
    async fn failed_second_rename_keeps_previous_pair() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let items_path = store.snapshot_path(PopulationKind::Items);
        let creators_path = store.snapshot_path(PopulationKind::Creators);
        std::fs::write(&items_path, "OLD ITEMS").expect("write");
        // A non-empty directory cannot be replaced by a file rename.
        std::fs::create_dir(&creators_path).expect("mkdir");
        std::fs::write(creators_path.join("keep"), "x").expect("write");

        let (items, creators) = snapshots();
        let result = store.commit_snapshots(&items, &creators).await;

        assert!(matches!(result, Err(RefreshError::Io { .. })));
        assert_eq!(std::fs::read_to_string(&items_path).expect("read"), "OLD ITEMS");
        assert!(!temp_path(&items_path).exists());
        assert!(!temp_path(&creators_path).exists());
        assert!(!backup_path(&items_path).exists());
    }

    #[tokio::test]
    async fn failed_first_commit_leaves_no_items_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SnapshotStore::new(dir.path());
        let creators_path = store.snapshot_path(PopulationKind::Creators);
        std::fs::create_dir(&creators_path).expect("mkdir");
        std::fs::write(creators_path.join("keep"), "x").expect("write");

        let (items, creators) = snapshots();
        assert!(store.commit_snapshots(&items, &creators).await.is_err());
        assert!(!store.snapshot_path(PopulationKind::Items).exists());
    }

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(temp_path(Path::new("/d/items.json")), PathBuf::from("/d/items.json.tmp"));
        assert_eq!(backup_path(Path::new("/d/items.json")), PathBuf::from("/d/items.json.bak"));
    }
}
