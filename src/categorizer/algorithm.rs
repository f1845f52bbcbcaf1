use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::categorizer::config::CategorizerConfig;
use crate::db::models::InventoryItem;

/// The three urgency tiers, ordered most to least urgent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum UrgencyTier {
    Red,
    Yellow,
    Green,
}

impl UrgencyTier {
    pub fn title(&self) -> &'static str {
        match self {
            UrgencyTier::Red => "Urgent (Expires in < 72h)",
            UrgencyTier::Yellow => "Consume Soon (3-7 Days)",
            UrgencyTier::Green => "Safe (> 7 Days)",
        }
    }
}

/// One urgency bucket as rendered by the dashboard. Recomputed on every
/// call, never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub tier: UrgencyTier,
    pub title: String,
    pub items: Vec<InventoryItem>,
}

/// Signed hours between an item's expiration and the evaluation instant.
/// Fractional, negative for items that are already expired.
fn hours_until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (expires_at - now).num_milliseconds() as f64 / 3_600_000.0
}

/// Assign a delta-in-hours to exactly one tier. The three ranges
/// partition the real line: h < 72 is Red, 72 <= h <= 168 is Yellow,
/// h > 168 is Green. Both boundary values land in Yellow.
fn classify(hours: f64, config: &CategorizerConfig) -> UrgencyTier {
    if hours < config.urgent_max_hours {
        UrgencyTier::Red
    } else if hours <= config.safe_min_hours {
        UrgencyTier::Yellow
    } else {
        UrgencyTier::Green
    }
}

/// Main categorization function: buckets items by time-to-expiration
/// relative to `now`.
///
/// Returns buckets in fixed Red, Yellow, Green order, each sorted by
/// ascending expiration; tiers with no items are omitted entirely.
/// Pure over its inputs, so callers must re-invoke whenever the item
/// snapshot changes.
pub fn categorize_inventory(
    items: &[InventoryItem],
    now: DateTime<Utc>,
    config: &CategorizerConfig,
) -> Vec<Bucket> {
    // Sort once up front; the per-tier partition below preserves this
    // order. Vec::sort_by_key is stable, so ties keep input order.
    let mut sorted: Vec<InventoryItem> = items.to_vec();
    sorted.sort_by_key(|item| item.expires_at);

    let mut red = Vec::new();
    let mut yellow = Vec::new();
    let mut green = Vec::new();

    for item in sorted {
        match classify(hours_until(item.expires_at, now), config) {
            UrgencyTier::Red => red.push(item),
            UrgencyTier::Yellow => yellow.push(item),
            UrgencyTier::Green => green.push(item),
        }
    }

    [
        (UrgencyTier::Red, red),
        (UrgencyTier::Yellow, yellow),
        (UrgencyTier::Green, green),
    ]
    .into_iter()
    .filter(|(_, tier_items)| !tier_items.is_empty())
    .map(|(tier, tier_items)| Bucket {
        tier,
        title: tier.title().to_string(),
        items: tier_items,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn item(name: &str, expires_at: DateTime<Utc>) -> InventoryItem {
        InventoryItem::new(
            name.to_string(),
            "https://via.placeholder.com/150".to_string(),
            1,
            expires_at,
            fixed_now(),
        )
    }

    fn names(bucket: &Bucket) -> Vec<&str> {
        bucket.items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        let buckets = categorize_inventory(&[], fixed_now(), &CategorizerConfig::default());
        assert!(buckets.is_empty());
    }

    #[test]
    fn one_item_per_tier_yields_three_buckets_in_fixed_order() {
        let now = fixed_now();
        let items = vec![
            item("safe", now + Duration::hours(300)),
            item("soon", now + Duration::hours(100)),
            item("urgent", now + Duration::hours(10)),
        ];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].tier, UrgencyTier::Red);
        assert_eq!(names(&buckets[0]), vec!["urgent"]);
        assert_eq!(buckets[1].tier, UrgencyTier::Yellow);
        assert_eq!(names(&buckets[1]), vec!["soon"]);
        assert_eq!(buckets[2].tier, UrgencyTier::Green);
        assert_eq!(names(&buckets[2]), vec!["safe"]);
    }

    #[test]
    fn empty_tiers_are_omitted() {
        let now = fixed_now();
        let items = vec![
            item("a", now + Duration::hours(500)),
            item("b", now + Duration::hours(600)),
            item("c", now + Duration::hours(550)),
        ];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].tier, UrgencyTier::Green);
        assert_eq!(names(&buckets[0]), vec!["a", "c", "b"]);
    }

    #[test]
    fn expired_items_are_urgent() {
        let now = fixed_now();
        let items = vec![item("old salad", now - Duration::hours(24))];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].tier, UrgencyTier::Red);
    }

    #[test]
    fn boundary_at_72_hours_is_yellow() {
        let now = fixed_now();
        let items = vec![item("edge", now + Duration::hours(72))];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets[0].tier, UrgencyTier::Yellow);
    }

    #[test]
    fn just_under_72_hours_is_red() {
        let now = fixed_now();
        let items = vec![item("edge", now + Duration::hours(72) - Duration::seconds(1))];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets[0].tier, UrgencyTier::Red);
    }

    #[test]
    fn boundary_at_168_hours_is_yellow() {
        let now = fixed_now();
        let items = vec![item("edge", now + Duration::hours(168))];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets[0].tier, UrgencyTier::Yellow);
    }

    #[test]
    fn just_over_168_hours_is_green() {
        let now = fixed_now();
        let items = vec![item("edge", now + Duration::hours(168) + Duration::seconds(1))];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets[0].tier, UrgencyTier::Green);
    }

    #[test]
    fn fractional_deltas_are_not_truncated() {
        let now = fixed_now();
        // 30 minutes out: truncating to whole hours would give 0 either way,
        // but a sub-hour delta must still land in Red, not anywhere else.
        let items = vec![item("milk", now + Duration::minutes(30))];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(buckets[0].tier, UrgencyTier::Red);
    }

    #[test]
    fn items_sorted_ascending_within_bucket() {
        let now = fixed_now();
        let items = vec![
            item("c", now + Duration::hours(50)),
            item("a", now + Duration::hours(2)),
            item("b", now + Duration::hours(20)),
        ];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(names(&buckets[0]), vec!["a", "b", "c"]);
        for pair in buckets[0].items.windows(2) {
            assert!(pair[0].expires_at <= pair[1].expires_at);
        }
    }

    #[test]
    fn ties_preserve_input_order() {
        let now = fixed_now();
        let expires = now + Duration::hours(10);
        let items = vec![item("first", expires), item("second", expires)];

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(names(&buckets[0]), vec!["first", "second"]);
    }

    #[test]
    fn no_items_dropped_or_duplicated() {
        let now = fixed_now();
        let items: Vec<InventoryItem> = (0..20i64)
            .map(|i| item(&format!("item-{i}"), now + Duration::hours(i * 17)))
            .collect();

        let buckets = categorize_inventory(&items, now, &CategorizerConfig::default());

        let total: usize = buckets.iter().map(|b| b.items.len()).sum();
        assert_eq!(total, items.len());
    }

    #[test]
    fn categorization_is_deterministic() {
        let now = fixed_now();
        let items = vec![
            item("a", now + Duration::hours(10)),
            item("b", now + Duration::hours(100)),
            item("c", now + Duration::hours(300)),
        ];

        let first = categorize_inventory(&items, now, &CategorizerConfig::default());
        let second = categorize_inventory(&items, now, &CategorizerConfig::default());

        assert_eq!(first, second);
    }
}
