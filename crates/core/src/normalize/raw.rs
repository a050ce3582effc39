//! Loosely-typed upstream catalog entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry as returned by the upstream catalog search.
///
/// The upstream shape is not trusted: every accessor tolerates missing or
/// mistyped fields and returns a neutral value instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawCatalogEntry(pub Value);

/// Timestamp fields consulted for the creation date, in priority order.
pub const CREATED_AT_FIELDS: [&str; 3] = ["dateCreated", "dateReleased", "dateModified"];

impl RawCatalogEntry {
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.0.get("id").and_then(Value::as_i64)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Author names in upstream order. Non-string names are skipped.
    #[must_use]
    pub fn author_names(&self) -> Vec<String> {
        self.0
            .get("authors")
            .and_then(Value::as_array)
            .map(|authors| {
                authors
                    .iter()
                    .filter_map(|a| a.get("name").and_then(Value::as_str))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Download count, or 0 when absent, negative or not a number.
    #[must_use]
    pub fn download_count(&self) -> u64 {
        let Some(value) = self.0.get("downloadCount") else {
            return 0;
        };
        if let Some(n) = value.as_u64() {
            return n;
        }
        match value.as_f64() {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "guarded to finite non-negative values"
            )]
            Some(n) if n.is_finite() && n >= 0.0 => n as u64,
            _ => 0,
        }
    }

    /// Category ids the entry is tagged with.
    #[must_use]
    pub fn category_ids(&self) -> Vec<i64> {
        self.0
            .get("categories")
            .and_then(Value::as_array)
            .map(|cats| cats.iter().filter_map(|c| c.get("id").and_then(Value::as_i64)).collect())
            .unwrap_or_default()
    }

    /// Canonical link of the entry (`links.websiteUrl`).
    #[must_use]
    pub fn website_url(&self) -> Option<&str> {
        self.0.get("links").and_then(|l| l.get("websiteUrl")).and_then(Value::as_str)
    }

    /// First non-empty creation timestamp among [`CREATED_AT_FIELDS`].
    #[must_use]
    pub fn created_at(&self) -> Option<&str> {
        CREATED_AT_FIELDS
            .iter()
            .filter_map(|field| self.0.get(*field).and_then(Value::as_str))
            .find(|ts| !ts.trim().is_empty())
    }
}

impl From<Value> for RawCatalogEntry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
