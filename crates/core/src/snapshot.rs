//! Snapshot documents and the population they carry.
//!
//! A snapshot's kind is resolved exactly once, when the document is decoded.
//! Everything downstream matches on [`Population`] instead of probing keys.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};
use crate::record::{CreatorSummary, ItemRecord};

/// Which population a view or snapshot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationKind {
    #[default]
    Items,
    Creators,
}

impl PopulationKind {
    pub const ALL: [Self; 2] = [Self::Items, Self::Creators];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Items => "items",
            Self::Creators => "creators",
        }
    }

    /// Key holding the record array in a snapshot document.
    #[must_use]
    pub const fn snapshot_key(&self) -> &'static str {
        self.as_str()
    }

    /// Key older snapshot documents used for the same array.
    #[must_use]
    pub const fn legacy_snapshot_key(&self) -> &'static str {
        match *self {
            Self::Items => "mods",
            Self::Creators => "authors",
        }
    }
}

impl fmt::Display for PopulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PopulationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "items" | "mods" => Ok(Self::Items),
            "creators" | "authors" => Ok(Self::Creators),
            other => Err(CoreError::InvalidInput(format!("unknown population: {other}"))),
        }
    }
}

/// A ranked-able population, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Population {
    Items(Vec<ItemRecord>),
    Creators(Vec<CreatorSummary>),
}

impl Population {
    #[must_use]
    pub const fn kind(&self) -> PopulationKind {
        match *self {
            Self::Items(_) => PopulationKind::Items,
            Self::Creators(_) => PopulationKind::Creators,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Creators(creators) => creators.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Items snapshot as written by the batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsSnapshot {
    pub generated_at: DateTime<Utc>,
    #[serde(alias = "mods")]
    pub items: Vec<ItemRecord>,
}

/// Creators snapshot as written by the batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorsSnapshot {
    pub generated_at: DateTime<Utc>,
    #[serde(alias = "authors")]
    pub creators: Vec<CreatorSummary>,
}

/// A decoded snapshot of either kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub generated_at: Option<DateTime<Utc>>,
    pub population: Population,
}

impl Snapshot {
    /// Decode a snapshot document, resolving its population kind from shape.
    ///
    /// # Errors
    /// Returns [`CoreError::UnrecognizedSnapshot`] when the document is not an
    /// object holding an items or creators array, or when the records in that
    /// array do not decode.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Decode a snapshot from an already-parsed JSON value.
    ///
    /// # Errors
    /// See [`Snapshot::from_slice`].
    pub fn from_value(mut value: Value) -> Result<Self> {
        let Some(object) = value.as_object_mut() else {
            return Err(CoreError::UnrecognizedSnapshot("document is not an object".to_owned()));
        };

        let generated_at = object
            .get("generatedAt")
            .and_then(Value::as_str)
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.with_timezone(&Utc));

        for kind in PopulationKind::ALL {
            let records = object
                .remove(kind.snapshot_key())
                .or_else(|| object.remove(kind.legacy_snapshot_key()));
            let Some(records) = records else {
                continue;
            };
            if !records.is_array() {
                return Err(CoreError::UnrecognizedSnapshot(format!(
                    "`{}` is not an array",
                    kind.snapshot_key()
                )));
            }
            let population = decode_population(kind, records)?;
            return Ok(Self { generated_at, population });
        }

        Err(CoreError::UnrecognizedSnapshot("no items or creators array".to_owned()))
    }
}

impl From<ItemsSnapshot> for Snapshot {
    fn from(snapshot: ItemsSnapshot) -> Self {
        Self {
            generated_at: Some(snapshot.generated_at),
            population: Population::Items(snapshot.items),
        }
    }
}

impl From<CreatorsSnapshot> for Snapshot {
    fn from(snapshot: CreatorsSnapshot) -> Self {
        Self {
            generated_at: Some(snapshot.generated_at),
            population: Population::Creators(snapshot.creators),
        }
    }
}

fn decode_population(kind: PopulationKind, records: Value) -> Result<Population> {
    let shape_error =
        |e: serde_json::Error| CoreError::UnrecognizedSnapshot(format!("{kind} records: {e}"));
    match kind {
        PopulationKind::Items => {
            serde_json::from_value(records).map(Population::Items).map_err(shape_error)
        },
        PopulationKind::Creators => {
            serde_json::from_value(records).map(Population::Creators).map_err(shape_error)
        },
    }
}
