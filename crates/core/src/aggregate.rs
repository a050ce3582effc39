//! Creator rollups.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::age::{MIN_AGE_DAYS, days_since, rate, round2};
use crate::record::{CreatorSummary, ItemRecord};

struct CreatorTally<'a> {
    name: &'a str,
    download_count: u64,
    item_count: u32,
    ages: Vec<f64>,
}

impl CreatorTally<'_> {
    fn mean_age(&self) -> f64 {
        if self.ages.is_empty() {
            return MIN_AGE_DAYS;
        }
        #[allow(clippy::cast_precision_loss, reason = "item counts are small")]
        let count = self.ages.len() as f64;
        self.ages.iter().sum::<f64>() / count
    }

    fn into_summary(self) -> CreatorSummary {
        let mean_age = self.mean_age();
        CreatorSummary {
            name: self.name.to_owned(),
            download_count: self.download_count,
            item_count: self.item_count,
            download_rate: rate(self.download_count, mean_age),
            days_existing: round2(mean_age),
        }
    }
}

/// Roll items up into one summary per creator.
///
/// Every name in an item's creator list receives the item, once. Ages are
/// recomputed from each item's `createdAt` against `now`; items without a
/// timestamp count toward downloads and item count but not toward the mean
/// age. Output order is the order in which creators are first encountered,
/// which later acts as the tie-break order when ranking.
#[must_use]
pub fn aggregate_creators(items: &[ItemRecord], now: DateTime<Utc>) -> Vec<CreatorSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<CreatorTally<'_>> = Vec::new();

    for item in items {
        let age = item.created_at.as_deref().map(|ts| days_since(ts, now));
        let mut seen: Vec<&str> = Vec::with_capacity(item.authors.len());

        for name in &item.authors {
            let name = name.as_str();
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);

            let slot = *index.entry(name).or_insert_with(|| {
                tallies.push(CreatorTally {
                    name,
                    download_count: 0,
                    item_count: 0,
                    ages: Vec::new(),
                });
                tallies.len() - 1
            });
            let Some(tally) = tallies.get_mut(slot) else {
                continue;
            };
            tally.download_count = tally.download_count.saturating_add(item.download_count);
            tally.item_count = tally.item_count.saturating_add(1);
            if let Some(age) = age {
                tally.ages.push(age);
            }
        }
    }

    tracing::debug!(items = items.len(), creators = tallies.len(), "aggregated creators");
    tallies.into_iter().map(CreatorTally::into_summary).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().expect("valid date")
    }

    fn item(name: &str, authors: &[&str], downloads: u64, age_days: Option<i64>) -> ItemRecord {
        let created_at = age_days.map(|d| (now() - Duration::days(d)).to_rfc3339());
        ItemRecord {
            id: None,
            name: name.to_owned(),
            author: authors.first().map(|a| (*a).to_owned()),
            authors: authors.iter().map(|a| (*a).to_owned()).collect(),
            download_count: downloads,
            download_rate: 0.0,
            created_at,
            days_existing: 0.0,
        }
    }

    #[test]
    fn orion_rollup() {
        let items = vec![
            item("Create A", &["Orion"], 40, Some(4)),
            item("Create B", &["Orion"], 60, Some(6)),
        ];
        let creators = aggregate_creators(&items, now());
        assert_eq!(creators.len(), 1);
        let orion = &creators[0];
        assert_eq!(orion.name, "Orion");
        assert_eq!(orion.download_count, 100);
        assert_eq!(orion.item_count, 2);
        assert_eq!(orion.days_existing, 5.0);
        assert_eq!(orion.download_rate, 20.0);
    }

    #[test]
    fn co_created_items_count_for_every_creator() {
        let items = vec![
            item("Create A", &["Orion", "Vega"], 10, Some(1)),
            item("Create B", &["Vega"], 5, Some(1)),
        ];
        let creators = aggregate_creators(&items, now());
        let names: Vec<&str> = creators.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Orion", "Vega"]);
        assert_eq!(creators[0].download_count, 10);
        assert_eq!(creators[1].download_count, 15);
        assert_eq!(creators[1].item_count, 2);
    }

    #[test]
    fn duplicate_names_in_one_item_count_once() {
        let items = vec![item("Create A", &["Orion", "Orion"], 10, Some(2))];
        let creators = aggregate_creators(&items, now());
        assert_eq!(creators[0].download_count, 10);
        assert_eq!(creators[0].item_count, 1);
    }

    #[test]
    fn undated_items_skip_mean_age() {
        let items = vec![
            item("Create A", &["Orion"], 30, None),
            item("Create B", &["Orion"], 30, Some(3)),
        ];
        let creators = aggregate_creators(&items, now());
        assert_eq!(creators[0].days_existing, 3.0);
        assert_eq!(creators[0].download_rate, 20.0);

        let undated = aggregate_creators(&[item("Create C", &["Vega"], 8, None)], now());
        assert_eq!(undated[0].days_existing, 1.0);
        assert_eq!(undated[0].download_rate, 8.0);
    }

    #[test]
    fn total_downloads_match_listing_items() {
        let items = vec![
            item("A", &["Orion", "Vega"], 11, Some(2)),
            item("B", &["Vega", "Lyra"], 13, Some(3)),
            item("C", &["Lyra"], 17, Some(4)),
            item("D", &[], 99, Some(5)),
        ];
        for creator in aggregate_creators(&items, now()) {
            let expected: u64 = items
                .iter()
                .filter(|i| i.authors.contains(&creator.name))
                .map(|i| i.download_count)
                .sum();
            assert_eq!(creator.download_count, expected, "creator {}", creator.name);
        }
    }

    #[test]
    fn aggregation_is_deterministic() {
        let items = vec![
            item("A", &["Orion", "Vega"], 11, Some(2)),
            item("B", &["Vega", "Lyra"], 13, Some(3)),
        ];
        assert_eq!(aggregate_creators(&items, now()), aggregate_creators(&items, now()));
    }
}
