//! Creator leaderboard messages for chat webhooks.

use modrank_client::WebhookClient;
use modrank_core::{
    CreatorSummary, NOTIFY_MESSAGE_LIMIT, Population, RankedEntry, SortDirection, rank_population,
    round2,
};
use serde::Serialize;

use crate::dashboard::SnapshotSource;
use crate::error::NotifyError;

/// Lines of the top of the leaderboard included in a message.
pub const DEFAULT_TOP_N: usize = 10;

/// Where one creator stands against the whole creator population.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub name: String,
    /// 1-based rank by total downloads.
    pub rank: usize,
    pub population: usize,
    pub download_count: u64,
    /// Share of creators ranked below, as a percentage.
    pub percentile: f64,
    /// Downloads as a percentage of the leader's.
    pub dominance: f64,
    pub leader: String,
}

fn ranked_by_downloads(creators: &[CreatorSummary]) -> Vec<RankedEntry<'_, CreatorSummary>> {
    rank_population(creators, "downloads", SortDirection::Descending).entries().to_vec()
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 { 100.0 } else { round2(part / whole * 100.0) }
}

/// Standing of `name` (case-insensitive) among `creators`.
#[must_use]
pub fn standing(creators: &[CreatorSummary], name: &str) -> Option<Standing> {
    let ranked = ranked_by_downloads(creators);
    let leader = ranked.first()?.record;
    let wanted = name.trim().to_lowercase();
    let entry = ranked.iter().find(|e| e.record.name.to_lowercase() == wanted)?;
    let population = ranked.len();

    #[allow(clippy::cast_precision_loss, reason = "creator counts and downloads fit f64")]
    let (percentile, dominance) = (
        percentage((population - entry.rank) as f64, population as f64),
        percentage(entry.record.download_count as f64, leader.download_count as f64),
    );

    Some(Standing {
        name: entry.record.name.clone(),
        rank: entry.rank,
        population,
        download_count: entry.record.download_count,
        percentile,
        dominance,
        leader: leader.name.clone(),
    })
}

fn leaderboard_line(entry: &RankedEntry<'_, CreatorSummary>) -> String {
    format!(
        "#{} {}: {} downloads, {} mods, {}/day",
        entry.rank,
        entry.record.name,
        entry.record.download_count,
        entry.record.item_count,
        entry.record.download_rate
    )
}

/// Message lines: the top `top_n`, the creator's own line if it falls
/// outside them, then a summary of the standing.
#[must_use]
pub fn format_leaderboard(
    creators: &[CreatorSummary],
    standing: &Standing,
    top_n: usize,
) -> Vec<String> {
    let ranked = ranked_by_downloads(creators);
    let mut lines = vec![format!("**Creator leaderboard** ({} creators)", ranked.len())];
    lines.extend(ranked.iter().take(top_n).map(leaderboard_line));
    if standing.rank > top_n {
        lines.push("...".to_owned());
        if let Some(own) = ranked.iter().find(|e| e.rank == standing.rank) {
            lines.push(leaderboard_line(own));
        }
    }
    lines.push(format!(
        "{} is #{} of {}, ahead of {}% of creators, with {}% of {}'s downloads.",
        standing.name,
        standing.rank,
        standing.population,
        standing.percentile,
        standing.dominance,
        standing.leader
    ));
    lines
}

/// Join lines into messages of fewer than `limit` characters, breaking only
/// between lines. A single line that is too long on its own is split.
#[must_use]
pub fn chunk_lines(lines: &[String], limit: usize) -> Vec<String> {
    let max_chars = limit.saturating_sub(1).max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0_usize;

    for line in lines {
        for piece in split_long_line(line, max_chars) {
            let piece_chars = piece.chars().count();
            let needed =
                if current.is_empty() { piece_chars } else { current_chars + 1 + piece_chars };
            if needed > max_chars && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_chars = 0;
            }
            if !current.is_empty() {
                current.push('\n');
                current_chars += 1;
            }
            current.push_str(&piece);
            current_chars += piece_chars;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_long_line(line: &str, max_chars: usize) -> Vec<String> {
    if line.chars().count() <= max_chars {
        return vec![line.to_owned()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(max_chars).map(|c| c.iter().collect()).collect()
}

/// Load the creators snapshot, build the message for `name` and post it.
/// Returns the number of messages sent.
///
/// # Errors
/// [`NotifyError::UnknownCreator`] if `name` is not in the snapshot, or a
/// snapshot or webhook error.
pub async fn notify<S>(
    source: &S,
    webhook: &WebhookClient,
    name: &str,
    top_n: usize,
) -> Result<usize, NotifyError>
where
    S: SnapshotSource + ?Sized,
{
    let snapshot = source.load(modrank_core::PopulationKind::Creators).await?;
    let creators = match snapshot.population {
        Population::Creators(creators) => creators,
        other @ Population::Items(_) => return Err(NotifyError::WrongPopulation(other.kind())),
    };
    let standing =
        standing(&creators, name).ok_or_else(|| NotifyError::UnknownCreator(name.to_owned()))?;
    let lines = format_leaderboard(&creators, &standing, top_n);
    let messages = chunk_lines(&lines, NOTIFY_MESSAGE_LIMIT);
    tracing::info!(
        creator = %standing.name,
        rank = standing.rank,
        messages = messages.len(),
        "posting leaderboard"
    );
    Ok(webhook.post_all(&messages).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creator(name: &str, downloads: u64) -> CreatorSummary {
        CreatorSummary {
            name: name.to_owned(),
            download_count: downloads,
            item_count: 1,
            download_rate: 1.0,
            days_existing: 1.0,
        }
    }

    fn creators() -> Vec<CreatorSummary> {
        vec![
            creator("Vega", 400),
            creator("Orion", 100),
            creator("Lyra", 200),
            creator("Deneb", 50),
        ]
    }

    #[test]
    fn standing_reports_rank_percentile_and_dominance() {
        let s = standing(&creators(), "orion").expect("orion");
        assert_eq!(s.name, "Orion");
        assert_eq!(s.rank, 3);
        assert_eq!(s.population, 4);
        assert_eq!(s.percentile, 25.0);
        assert_eq!(s.dominance, 25.0);
        assert_eq!(s.leader, "Vega");
    }

    #[test]
    fn leader_has_full_dominance() {
        let s = standing(&creators(), "Vega").expect("vega");
        assert_eq!(s.rank, 1);
        assert_eq!(s.percentile, 75.0);
        assert_eq!(s.dominance, 100.0);
    }

    #[test]
    fn unknown_creator_has_no_standing() {
        assert!(standing(&creators(), "Sirius").is_none());
        assert!(standing(&[], "Vega").is_none());
    }

    #[test]
    fn creator_outside_top_gets_own_line() {
        let all = creators();
        let s = standing(&all, "Deneb").expect("deneb");
        let lines = format_leaderboard(&all, &s, 2);
        assert_eq!(lines[1], "#1 Vega: 400 downloads, 1 mods, 1/day");
        assert_eq!(lines[3], "...");
        assert!(lines[4].starts_with("#4 Deneb"));
        assert!(lines[5].starts_with("Deneb is #4 of 4"));
    }

    #[test]
    fn chunks_break_on_lines_and_stay_under_limit() {
        let lines: Vec<String> =
            (0..50).map(|i| format!("line {i:02} {}", "x".repeat(30))).collect();
        let chunks = chunk_lines(&lines, 200);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() < 200);
        }
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.lines()).collect();
        assert_eq!(rejoined.len(), 50);
        assert_eq!(rejoined[49], lines[49]);
    }

    #[test]
    fn oversized_line_is_split() {
        let chunks = chunk_lines(&["y".repeat(25)], 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() < 10));
    }
}
