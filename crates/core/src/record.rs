//! Item and creator records.
//!
//! Field names follow the snapshot wire format (camelCase). The same names
//! are what [`Rankable::field`] resolves, so any serialized field can be
//! used as a sort key.

use serde::{Deserialize, Serialize};

/// A single field value read off a record for ranking or charting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl FieldValue<'_> {
    /// Numeric view of the value; text reads as zero.
    #[must_use]
    pub const fn as_number(&self) -> f64 {
        match *self {
            Self::Number(n) => n,
            Self::Text(_) => 0.0,
        }
    }
}

/// A population member that can be ranked, searched and charted.
pub trait Rankable {
    /// Look up a field by its wire name or its legacy lowercase spelling.
    /// Unknown names return `None`.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    /// Name shown on chart labels and matched by search.
    fn display_name(&self) -> &str;

    /// Secondary creator attribute, present only on items.
    fn primary_creator(&self) -> Option<&str> {
        None
    }
}

/// One normalized catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: String,
    /// Primary creator: the first entry of `authors`.
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, alias = "downloadcount")]
    pub download_count: u64,
    #[serde(default, alias = "downloadrate")]
    pub download_rate: f64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub days_existing: f64,
}

impl Rankable for ItemRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        #[allow(clippy::cast_precision_loss, reason = "ids and counts fit f64 mantissa")]
        let value = match name {
            "id" => FieldValue::Number(self.id.unwrap_or(0) as f64),
            "name" => FieldValue::Text(&self.name),
            "author" => FieldValue::Text(self.author.as_deref().unwrap_or("")),
            "createdAt" => FieldValue::Text(self.created_at.as_deref().unwrap_or("")),
            "downloadCount" | "downloadcount" => FieldValue::Number(self.download_count as f64),
            "downloadRate" | "downloadrate" => FieldValue::Number(self.download_rate),
            "daysExisting" | "daysexisting" => FieldValue::Number(self.days_existing),
            _ => return None,
        };
        Some(value)
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn primary_creator(&self) -> Option<&str> {
        self.author.as_deref()
    }
}

/// Per-creator rollup of item statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "downloadcount")]
    pub download_count: u64,
    #[serde(default, alias = "mods")]
    pub item_count: u32,
    #[serde(default, alias = "downloadrate")]
    pub download_rate: f64,
    /// Mean age of the creator's items, in days.
    #[serde(default)]
    pub days_existing: f64,
}

impl Rankable for CreatorSummary {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        #[allow(clippy::cast_precision_loss, reason = "counts fit f64 mantissa")]
        let value = match name {
            "name" => FieldValue::Text(&self.name),
            "downloadCount" | "downloadcount" => FieldValue::Number(self.download_count as f64),
            "itemCount" | "mods" => FieldValue::Number(f64::from(self.item_count)),
            "downloadRate" | "downloadrate" => FieldValue::Number(self.download_rate),
            "daysExisting" | "daysexisting" => FieldValue::Number(self.days_existing),
            _ => return None,
        };
        Some(value)
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}
