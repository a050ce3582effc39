//! Chart presentation.
//!
//! [`present_chart`] turns a [`ChartModel`] into a concrete [`ChartSpec`] for
//! the active [`ViewMode`]. [`ChartSurface`] holds at most one mounted chart
//! and tears the previous one down before mounting the next.

use std::fmt;
use std::mem;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{GROUPED_MIN_ROWS, GROUPED_ROW_HEIGHT_PX, PROPORTIONAL_AREA_PX};
use crate::error::CoreError;
use crate::series::{AxisId, ChartModel, SeriesDescriptor};
use crate::view_state::ViewState;

/// How the series bundle is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Every series at once, one value axis per series.
    #[default]
    Grouped,
    /// A single series, one slice per entry.
    Proportional,
}

impl ViewMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Grouped => Self::Proportional,
            Self::Proportional => Self::Grouped,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Grouped => "grouped",
            Self::Proportional => "proportional",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grouped" | "bar" => Ok(Self::Grouped),
            "proportional" | "pie" => Ok(Self::Proportional),
            other => Err(CoreError::InvalidInput(format!("unknown view mode: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedChart {
    /// Category axis: one label per row.
    pub labels: Vec<String>,
    pub series: Vec<SeriesDescriptor>,
    /// One value axis per present series, in series order.
    pub value_axes: Vec<AxisId>,
    pub height_px: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProportionalChart {
    pub series: SeriesDescriptor,
    pub slices: Vec<Slice>,
    pub height_px: u32,
}

/// A fully laid-out chart, ready to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ChartSpec {
    Grouped(GroupedChart),
    Proportional(ProportionalChart),
}

impl ChartSpec {
    #[must_use]
    pub const fn mode(&self) -> ViewMode {
        match *self {
            Self::Grouped(_) => ViewMode::Grouped,
            Self::Proportional(_) => ViewMode::Proportional,
        }
    }

    /// Number of rows (grouped) or slices (proportional).
    #[must_use]
    pub fn entry_count(&self) -> usize {
        match self {
            Self::Grouped(chart) => chart.labels.len(),
            Self::Proportional(chart) => chart.slices.len(),
        }
    }
}

/// Grouped area height: rows for the larger of the request and the minimum.
#[must_use]
pub fn grouped_height_px(requested_rows: usize) -> u32 {
    let rows = u32::try_from(requested_rows.max(GROUPED_MIN_ROWS)).unwrap_or(u32::MAX);
    rows.saturating_mul(GROUPED_ROW_HEIGHT_PX)
}

/// Lay out `model` for the state's view mode.
///
/// The proportional view picks the series matching the active sort key, or
/// the first series when none matches, and forces it visible. Returns `None`
/// only when the model has no series at all.
#[must_use]
pub fn present_chart(model: ChartModel, state: &ViewState) -> Option<ChartSpec> {
    match state.mode {
        ViewMode::Grouped => {
            let value_axes = model.series.iter().map(|s| s.axis).collect();
            Some(ChartSpec::Grouped(GroupedChart {
                labels: model.labels,
                series: model.series,
                value_axes,
                height_px: grouped_height_px(state.max_entries),
            }))
        },
        ViewMode::Proportional => {
            let ChartModel { labels, series } = model;
            let position = series.iter().position(|s| s.sort_alias == state.sort_key).unwrap_or(0);
            let mut selected = series.into_iter().nth(position)?;
            selected.visible = true;
            let slices = labels
                .into_iter()
                .zip(selected.values.iter().copied())
                .map(|(label, value)| Slice { label, value })
                .collect();
            Some(ChartSpec::Proportional(ProportionalChart {
                series: selected,
                slices,
                height_px: PROPORTIONAL_AREA_PX,
            }))
        },
    }
}

/// A chart that has been mounted on a surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountedChart {
    pub instance: u64,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SurfaceContent {
    #[default]
    Empty,
    Chart(MountedChart),
    Failed { message: String },
}

/// Render target holding at most one live chart.
#[derive(Debug, Default)]
pub struct ChartSurface {
    content: SurfaceContent,
    mounted: u64,
    torn_down: u64,
}

impl ChartSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down the current chart, then mount `spec`. Returns the new instance id.
    pub fn mount(&mut self, spec: ChartSpec) -> u64 {
        self.teardown();
        self.mounted = self.mounted.saturating_add(1);
        let instance = self.mounted;
        tracing::debug!(instance, mode = %spec.mode(), entries = spec.entry_count(), "mounted chart");
        self.content = SurfaceContent::Chart(MountedChart { instance, spec });
        instance
    }

    /// Replace whatever is shown with an inline failure indicator.
    pub fn show_failure(&mut self, message: impl Into<String>) {
        self.teardown();
        self.content = SurfaceContent::Failed { message: message.into() };
    }

    #[must_use]
    pub const fn content(&self) -> &SurfaceContent {
        &self.content
    }

    #[must_use]
    pub fn current_chart(&self) -> Option<&MountedChart> {
        match &self.content {
            SurfaceContent::Chart(chart) => Some(chart),
            SurfaceContent::Empty | SurfaceContent::Failed { .. } => None,
        }
    }

    /// Charts mounted and not yet torn down. Never more than one.
    #[must_use]
    pub const fn live_instances(&self) -> u64 {
        self.mounted.saturating_sub(self.torn_down)
    }

    fn teardown(&mut self) {
        if let SurfaceContent::Chart(previous) = mem::take(&mut self.content) {
            self.torn_down = self.torn_down.saturating_add(1);
            tracing::debug!(instance = previous.instance, "tore down chart");
        }
    }
}
