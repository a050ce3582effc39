use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use modrank_client::HttpSnapshotSource;
use modrank_core::{
    ChartSpec, GroupedChart, ProportionalChart, RenderedView, SeriesDescriptor, ViewState, round2,
};
use modrank_service::{Dashboard, RenderOutcome, SnapshotSource, SnapshotStore};

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Json,
    Text,
}

pub(crate) struct ChartArgs {
    pub(crate) population: String,
    pub(crate) sort: String,
    pub(crate) dir: String,
    pub(crate) query: String,
    pub(crate) max: usize,
    pub(crate) mode: String,
    pub(crate) format: OutputFormat,
    pub(crate) server: Option<String>,
}

impl ChartArgs {
    fn view_state(&self) -> Result<ViewState> {
        Ok(ViewState {
            population: self.population.parse()?,
            sort_key: self.sort.trim().to_owned(),
            direction: self.dir.parse()?,
            search: self.query.clone(),
            max_entries: self.max.max(1),
            mode: self.mode.parse()?,
        })
    }
}

pub(crate) async fn run(store: SnapshotStore, args: ChartArgs) -> Result<()> {
    let state = args.view_state()?;
    let view = match args.server.as_deref() {
        Some(url) => {
            let source = HttpSnapshotSource::new(url).context("invalid server url")?;
            render(source, state.clone()).await?
        },
        None => render(store, state.clone()).await?,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Text => print!("{}", render_text(&view, &state.sort_key)),
    }
    Ok(())
}

async fn render<S: SnapshotSource>(source: S, state: ViewState) -> Result<RenderedView> {
    let dashboard = Dashboard::with_state(source, state);
    match dashboard.refresh().await {
        RenderOutcome::Rendered { view, .. } => Ok(view),
        RenderOutcome::NoData { reason, .. } => bail!("no data: {reason}"),
        RenderOutcome::Superseded { generation } => bail!("render {generation} was superseded"),
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "ratio is within 0..=1 so the width fits"
    )]
    let width = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(width.max(1))
}

fn max_value(values: impl Iterator<Item = f64>) -> f64 {
    values.fold(0.0, f64::max)
}

fn render_grouped(chart: &GroupedChart, sort_key: &str) -> String {
    let Some(series) = chart
        .series
        .iter()
        .find(|s| s.sort_alias == sort_key)
        .or_else(|| chart.series.first())
    else {
        return String::new();
    };
    let width = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let max = max_value(series.values.iter().copied());

    let mut out = format!("{}\n", series.label);
    for (label, value) in chart.labels.iter().zip(&series.values) {
        out.push_str(&format!(
            "{label:<width$}  {:>12}  {}\n",
            round2(*value),
            bar(*value, max)
        ));
    }
    out
}

fn render_proportional(chart: &ProportionalChart) -> String {
    let SeriesDescriptor { label, .. } = &chart.series;
    let total: f64 = chart.slices.iter().map(|s| s.value).sum();
    let width = chart.slices.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);
    let max = max_value(chart.slices.iter().map(|s| s.value));

    let mut out = format!("{label}\n");
    for slice in &chart.slices {
        let share = if total > 0.0 { round2(slice.value / total * 100.0) } else { 0.0 };
        out.push_str(&format!(
            "{:<width$}  {:>6}%  {}\n",
            slice.label,
            share,
            bar(slice.value, max)
        ));
    }
    out
}

/// Plain-text rendering of a view for terminals.
pub(crate) fn render_text(view: &RenderedView, sort_key: &str) -> String {
    let mut header = format!(
        "{} · {} of {} shown ({} matched)\n",
        view.population,
        view.chart.entry_count(),
        view.total,
        view.matched
    );
    if let Some(generated_at) = view.generated_at {
        let stamp = generated_at.format("%Y-%m-%d %H:%M UTC");
        header.push_str(&format!("Data generated: {stamp}\n"));
    }
    let body = match &view.chart {
        ChartSpec::Grouped(chart) => render_grouped(chart, sort_key),
        ChartSpec::Proportional(chart) => render_proportional(chart),
    };
    header + &body
}
