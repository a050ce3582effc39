//! Series building: a window of ranked entries into an index-aligned chart model.

use serde::Serialize;

use crate::record::Rankable;
use crate::snapshot::PopulationKind;
use crate::view_filter::Window;

/// Value axis a series is plotted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AxisId {
    #[serde(rename = "rate-x")]
    Rate,
    #[serde(rename = "downloads-x")]
    Downloads,
    #[serde(rename = "mods-x")]
    ItemCount,
    #[serde(rename = "time-x")]
    Age,
}

impl AxisId {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Rate => "rate-x",
            Self::Downloads => "downloads-x",
            Self::ItemCount => "mods-x",
            Self::Age => "time-x",
        }
    }
}

/// Fill and border colours of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesStyle {
    pub background: &'static str,
    pub border: &'static str,
}

/// One named numeric sequence aligned with the windowed entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDescriptor {
    pub label: &'static str,
    /// Record field the values were read from.
    pub field: &'static str,
    /// Sort key this series corresponds to.
    pub sort_alias: &'static str,
    pub values: Vec<f64>,
    /// Initial display hint. Hidden series stay togglable.
    pub visible: bool,
    pub axis: AxisId,
    pub style: SeriesStyle,
}

/// Labels plus series, all aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub labels: Vec<String>,
    pub series: Vec<SeriesDescriptor>,
}

impl ChartModel {
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Series whose sort alias equals `sort_key`.
    #[must_use]
    pub fn series_for_sort(&self, sort_key: &str) -> Option<&SeriesDescriptor> {
        self.series.iter().find(|s| s.sort_alias == sort_key)
    }
}

struct SeriesTemplate {
    label: &'static str,
    field: &'static str,
    sort_alias: &'static str,
    visible: bool,
    axis: AxisId,
    style: SeriesStyle,
}

static RATE_SERIES: SeriesTemplate = SeriesTemplate {
    label: "Download Rate",
    field: "downloadRate",
    sort_alias: "downloadsRate",
    visible: true,
    axis: AxisId::Rate,
    style: SeriesStyle { background: "rgba(75,192,192,0.6)", border: "rgba(75,192,192,1)" },
};

static DOWNLOADS_SERIES: SeriesTemplate = SeriesTemplate {
    label: "Downloads",
    field: "downloadCount",
    sort_alias: "downloads",
    visible: false,
    axis: AxisId::Downloads,
    style: SeriesStyle { background: "rgba(245,140,28,0.6)", border: "rgba(245,140,28,1)" },
};

static ITEM_COUNT_SERIES: SeriesTemplate = SeriesTemplate {
    label: "Mods",
    field: "itemCount",
    sort_alias: "mods",
    visible: false,
    axis: AxisId::ItemCount,
    style: SeriesStyle { background: "rgba(100,100,255,0.4)", border: "rgba(100,100,255,1)" },
};

static AGE_SERIES: SeriesTemplate = SeriesTemplate {
    label: "Time (days)",
    field: "daysExisting",
    sort_alias: "time",
    visible: false,
    axis: AxisId::Age,
    style: SeriesStyle { background: "rgba(120,120,120,0.3)", border: "rgba(120,120,120,1)" },
};

fn series_templates(kind: PopulationKind) -> Vec<&'static SeriesTemplate> {
    match kind {
        PopulationKind::Items => vec![&RATE_SERIES, &DOWNLOADS_SERIES, &AGE_SERIES],
        PopulationKind::Creators => {
            vec![&RATE_SERIES, &DOWNLOADS_SERIES, &ITEM_COUNT_SERIES, &AGE_SERIES]
        },
    }
}

/// `#{rank} {name}`, plus ` (by {creator})` for entries that carry one.
#[must_use]
pub fn entry_label<R: Rankable>(rank: usize, record: &R) -> String {
    let mut label = format!("#{rank} {}", record.display_name());
    if let Some(creator) = record.primary_creator() {
        label.push_str(" (by ");
        label.push_str(creator);
        label.push(')');
    }
    label
}

fn read_value<R: Rankable>(record: &R, template: &SeriesTemplate) -> f64 {
    record.field(template.field).map_or(0.0, |v| v.as_number())
}

/// Build the chart model for a window of `kind` entries.
#[must_use]
pub fn build_chart_model<R: Rankable>(window: &Window<'_, R>, kind: PopulationKind) -> ChartModel {
    let labels = window.entries().iter().map(|e| entry_label(e.rank, e.record)).collect();
    let series = series_templates(kind)
        .into_iter()
        .map(|template| SeriesDescriptor {
            label: template.label,
            field: template.field,
            sort_alias: template.sort_alias,
            values: window.entries().iter().map(|e| read_value(e.record, template)).collect(),
            visible: template.visible,
            axis: template.axis,
            style: template.style,
        })
        .collect();
    ChartModel { labels, series }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{SortDirection, rank_population};
    use crate::record::{CreatorSummary, ItemRecord};
    use crate::view_filter::apply_view_filter;

    fn items() -> Vec<ItemRecord> {
        vec![
            ItemRecord {
                id: Some(1),
                name: "Create Deco".to_owned(),
                author: Some("Orion".to_owned()),
                authors: vec!["Orion".to_owned()],
                download_count: 40,
                download_rate: 10.0,
                created_at: None,
                days_existing: 4.0,
            },
            ItemRecord {
                id: Some(2),
                name: "Create Orphan".to_owned(),
                author: None,
                authors: Vec::new(),
                download_count: 90,
                download_rate: 90.0,
                created_at: None,
                days_existing: 1.0,
            },
        ]
    }

    #[test]
    fn item_model_has_three_series_in_order() {
        let population = items();
        let window = apply_view_filter(
            rank_population(&population, "downloads", SortDirection::Descending),
            "",
            20,
        );
        let model = build_chart_model(&window, PopulationKind::Items);
        assert_eq!(model.labels, vec!["#1 Create Orphan", "#2 Create Deco (by Orion)"]);
        let aliases: Vec<&str> = model.series.iter().map(|s| s.sort_alias).collect();
        assert_eq!(aliases, vec!["downloadsRate", "downloads", "time"]);
        let visible: Vec<bool> = model.series.iter().map(|s| s.visible).collect();
        assert_eq!(visible, vec![true, false, false]);
        assert_eq!(model.series[0].values, vec![90.0, 10.0]);
        assert_eq!(model.series[1].values, vec![90.0, 40.0]);
        for series in &model.series {
            assert_eq!(series.values.len(), model.labels.len());
        }
    }

    #[test]
    fn creator_model_inserts_item_count_series() {
        let population = vec![CreatorSummary {
            name: "Orion".to_owned(),
            download_count: 100,
            item_count: 2,
            download_rate: 20.0,
            days_existing: 5.0,
        }];
        let window = apply_view_filter(
            rank_population(&population, "downloads", SortDirection::Descending),
            "",
            20,
        );
        let model = build_chart_model(&window, PopulationKind::Creators);
        assert_eq!(model.labels, vec!["#1 Orion"]);
        let axes: Vec<AxisId> = model.series.iter().map(|s| s.axis).collect();
        assert_eq!(axes, vec![AxisId::Rate, AxisId::Downloads, AxisId::ItemCount, AxisId::Age]);
        assert_eq!(model.series[2].values, vec![2.0]);
        assert_eq!(model.series_for_sort("mods").map(|s| s.label), Some("Mods"));
    }

    #[test]
    fn missing_fields_read_as_zero() {
        let population = items();
        let window = apply_view_filter(
            rank_population(&population, "downloads", SortDirection::Descending),
            "",
            20,
        );
        let template = &ITEM_COUNT_SERIES;
        let value = read_value(window.entries()[0].record, template);
        assert_eq!(value, 0.0);
    }
}
