use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use modrank_service::SnapshotStore;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::chart::{ChartArgs, OutputFormat};

#[derive(Parser)]
#[command(name = "modrank")]
#[command(about = "Popularity rankings for add-on catalogs", long_about = None)]
struct Cli {
    /// Snapshot directory. Defaults to MODRANK_DATA_DIR, then ./data.
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the full catalog into the raw dump.
    Fetch {
        /// Stop after this many entries (0 = everything).
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Build both snapshots from the raw dump.
    Process,
    /// Fetch, then process.
    Refresh {
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Serve snapshots, server-rendered charts and the static viewer.
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Static files for the viewer.
        #[arg(long, default_value = "public")]
        public_dir: PathBuf,
    },
    /// Render a ranked view to stdout.
    Chart {
        /// items or creators
        #[arg(short = 'P', long, default_value = "items")]
        population: String,
        /// downloads, downloadsRate, mods, name, time, or any record field
        #[arg(short, long, default_value = "downloads")]
        sort: String,
        #[arg(long, default_value = "desc")]
        dir: String,
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short, long, default_value = "20")]
        max: usize,
        /// grouped or proportional
        #[arg(long, default_value = "grouped")]
        mode: String,
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
        /// Read snapshots from a running server instead of the data dir.
        #[arg(long)]
        server: Option<String>,
    },
    /// Post a creator's leaderboard standing to a webhook.
    Notify {
        creator: String,
        #[arg(short, long, default_value = "10")]
        top: usize,
        /// Overrides MODRANK_WEBHOOK_URL.
        #[arg(long)]
        webhook: Option<String>,
        /// Print the messages instead of posting them.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = cli.data_dir.map_or_else(SnapshotStore::from_env, SnapshotStore::new);

    match cli.command {
        Commands::Fetch { max_results } => commands::batch::run_fetch(store, max_results).await?,
        Commands::Process => commands::batch::run_process(store).await?,
        Commands::Refresh { max_results } => {
            commands::batch::run_refresh(store, max_results).await?;
        },
        Commands::Serve { port, host, public_dir } => {
            commands::serve::run(store, port, host, public_dir).await?;
        },
        Commands::Chart { population, sort, dir, query, max, mode, format, server } => {
            let args = ChartArgs { population, sort, dir, query, max, mode, format, server };
            commands::chart::run(store, args).await?;
        },
        Commands::Notify { creator, top, webhook, dry_run } => {
            commands::notify::run(store, &creator, top, webhook, dry_run).await?;
        },
    }

    Ok(())
}
