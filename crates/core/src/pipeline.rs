//! End-to-end view rendering: rank, filter, build series, present.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::chart::{ChartSpec, present_chart};
use crate::error::{CoreError, Result};
use crate::rank::rank_population;
use crate::record::Rankable;
use crate::series::build_chart_model;
use crate::snapshot::{Population, PopulationKind, Snapshot};
use crate::view_filter::apply_view_filter;
use crate::view_state::ViewState;

/// A presented chart plus the counts behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub population: PopulationKind,
    /// Size of the full population the static ranks were computed over.
    pub total: usize,
    /// Entries matching the search before the window was applied.
    pub matched: usize,
    /// When the snapshot behind this view was built, if it says.
    pub generated_at: Option<DateTime<Utc>>,
    pub chart: ChartSpec,
}

fn render_records<R: Rankable>(
    records: &[R],
    kind: PopulationKind,
    state: &ViewState,
) -> Result<RenderedView> {
    let ranking = rank_population(records, &state.sort_key, state.direction);
    let window = apply_view_filter(ranking, &state.search, state.max_entries);
    let matched = window.matched();
    let model = build_chart_model(&window, kind);
    let chart = present_chart(model, state)
        .ok_or_else(|| CoreError::InvalidInput(format!("no series for {kind}")))?;
    Ok(RenderedView { population: kind, total: records.len(), matched, generated_at: None, chart })
}

/// Render `population` under `state`.
///
/// The population's own kind decides the series set; `state.population` is
/// only consulted by callers choosing which snapshot to load.
///
/// # Errors
/// Returns [`CoreError::InvalidInput`] if no series can be laid out, which
/// does not happen for the built-in series sets.
pub fn render_view(population: &Population, state: &ViewState) -> Result<RenderedView> {
    tracing::debug!(
        population = %population.kind(),
        sort = %state.sort_key,
        direction = %state.direction,
        mode = %state.mode,
        "rendering view"
    );
    match population {
        Population::Items(items) => render_records(items, PopulationKind::Items, state),
        Population::Creators(creators) => {
            render_records(creators, PopulationKind::Creators, state)
        },
    }
}

/// Render a decoded snapshot under `state`, keeping its generation time.
///
/// # Errors
/// See [`render_view`].
pub fn render_snapshot(snapshot: &Snapshot, state: &ViewState) -> Result<RenderedView> {
    let view = render_view(&snapshot.population, state)?;
    Ok(RenderedView { generated_at: snapshot.generated_at, ..view })
}
