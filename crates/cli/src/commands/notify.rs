use anyhow::{Context, Result, bail};
use modrank_client::WebhookClient;
use modrank_core::{NOTIFY_MESSAGE_LIMIT, Population, PopulationKind};
use modrank_service::{SnapshotStore, chunk_lines, format_leaderboard, notify, standing};

pub(crate) async fn run(
    store: SnapshotStore,
    creator: &str,
    top_n: usize,
    webhook: Option<String>,
    dry_run: bool,
) -> Result<()> {
    if dry_run {
        return print_messages(&store, creator, top_n).await;
    }

    let webhook = match webhook {
        Some(url) => WebhookClient::new(url)?,
        None => WebhookClient::from_env()?
            .context("no webhook configured: pass --webhook or set MODRANK_WEBHOOK_URL")?,
    };
    let sent = notify(&store, &webhook, creator, top_n).await?;
    println!("Posted {sent} message(s) for {creator}");
    Ok(())
}

async fn print_messages(store: &SnapshotStore, creator: &str, top_n: usize) -> Result<()> {
    let snapshot = store.load_snapshot(PopulationKind::Creators).await?;
    let Population::Creators(creators) = snapshot.population else {
        bail!("creators snapshot holds items");
    };
    let standing =
        standing(&creators, creator).with_context(|| format!("creator not found: {creator}"))?;
    let lines = format_leaderboard(&creators, &standing, top_n);
    for message in chunk_lines(&lines, NOTIFY_MESSAGE_LIMIT) {
        println!("{message}\n");
    }
    Ok(())
}
