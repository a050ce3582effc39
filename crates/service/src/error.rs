//! Typed error enums for the service layer.
//!
//! Snapshot loading, batch refresh and notification each get their own enum
//! so callers can match on the failure mode they care about.

use std::io;
use std::path::PathBuf;

use modrank_client::ClientError;
use modrank_core::CoreError;
use thiserror::Error;

/// Failure to produce a decoded snapshot for the interactive side.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// No snapshot file exists yet for the requested population.
    #[error("snapshot not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Document is not an items or creators snapshot.
    #[error("unrecognized snapshot shape: {0}")]
    UnrecognizedShape(String),

    /// Remote retrieval failed.
    #[error("fetch: {0}")]
    Fetch(#[from] ClientError),
}

impl From<CoreError> for SnapshotError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnrecognizedSnapshot(reason) => Self::UnrecognizedShape(reason),
            other => Self::UnrecognizedShape(other.to_string()),
        }
    }
}

/// Failure of the offline batch run. Prior snapshots stay in place.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("catalog fetch: {0}")]
    Fetch(#[from] ClientError),

    #[error("filter configuration: {0}")]
    Filter(#[from] CoreError),

    #[error("no raw catalog at {}; run `modrank fetch` first", path.display())]
    MissingRaw { path: PathBuf },

    #[error("raw catalog at {} is not a JSON array: {source}", path.display())]
    InvalidRaw {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure to build or deliver a leaderboard notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("creator not found: {0}")]
    UnknownCreator(String),

    #[error("expected a creators snapshot, found {0}")]
    WrongPopulation(modrank_core::PopulationKind),

    #[error("snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("webhook: {0}")]
    Webhook(#[from] ClientError),
}
