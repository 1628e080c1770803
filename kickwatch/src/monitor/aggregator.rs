//! Concurrent fan-out over the roster.

use std::collections::HashMap;

use chrono::Utc;
use futures::future::join_all;
use tracing::debug;

use crate::config::{Roster, StreamerConfig};
use crate::domain::{AggregateSnapshot, ChannelSnapshot};

use super::fetcher::{ChannelApi, ChannelFetcher};

/// Fetch every roster entry concurrently and merge the roster's curated
/// fields into the results.
///
/// All fetches are awaited together; a failing channel only yields its own
/// failure snapshot. The output preserves roster order regardless of which
/// fetch finishes first, and `checked_at` is taken once every fetch resolved.
pub async fn aggregate<A: ChannelApi>(
    fetcher: &ChannelFetcher<A>,
    roster: &Roster,
) -> AggregateSnapshot {
    let fetches = roster.iter().map(|entry| fetcher.fetch(&entry.username));
    let mut channels = join_all(fetches).await;

    merge_roster(&mut channels, roster);

    let snapshot = AggregateSnapshot::new(Utc::now(), channels);
    debug!(
        channels = snapshot.len(),
        live = snapshot.live_count(),
        failed = snapshot.failed_count(),
        "Aggregation complete"
    );
    snapshot
}

/// Attach roster metadata by exact username match.
fn merge_roster(channels: &mut [ChannelSnapshot], roster: &Roster) {
    let by_username: HashMap<String, &StreamerConfig> = roster
        .iter()
        .map(|entry| (entry.resolved_username(), entry))
        .collect();

    for channel in channels.iter_mut() {
        if let Some(entry) = by_username.get(&channel.username) {
            channel.merge_config(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::fetcher::tests::{FakeApi, live_payload, offline_payload};
    use std::time::Duration;

    fn roster(entries: &[(&str, &[&str])]) -> Roster {
        Roster::new(
            entries
                .iter()
                .map(|(name, tags)| StreamerConfig::new(*name).with_tags(tags.iter().copied()))
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_output_follows_roster_order_not_completion_order() {
        let api = FakeApi::default()
            .with_channel("slow", live_payload("slow", 10))
            .with_channel("fast", offline_payload("fast"))
            .with_channel("medium", live_payload("medium", 5))
            .with_latency("slow", Duration::from_millis(60))
            .with_latency("medium", Duration::from_millis(20));
        let fetcher = ChannelFetcher::new(api);
        let roster = roster(&[("slow", &["rp"]), ("fast", &[]), ("medium", &["pvp"])]);

        let snapshot = aggregate(&fetcher, &roster).await;
        let names: Vec<_> = snapshot.channels.iter().map(|c| c.username.as_str()).collect();
        assert_eq!(names, ["slow", "fast", "medium"]);
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        let api = FakeApi::default()
            .with_channel("a", live_payload("a", 1))
            .with_status("b", 500)
            .with_channel("c", offline_payload("c"));
        let fetcher = ChannelFetcher::new(api);
        let roster = roster(&[("a", &[]), ("b", &["rp"]), ("c", &[])]);

        let snapshot = aggregate(&fetcher, &roster).await;
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.failed_count(), 1);
        assert!(snapshot.get("a").is_some_and(|c| c.is_live && !c.error));
        assert!(snapshot.get("c").is_some_and(|c| !c.error));

        let failed = snapshot.get("b").unwrap();
        assert!(failed.error);
        assert!(failed.tags.contains("rp"), "roster fields merge into failures too");
    }

    #[tokio::test]
    async fn test_roster_fields_are_merged() {
        let api = FakeApi::default().with_channel("sxb", live_payload("SXB", 100));
        let fetcher = ChannelFetcher::new(api);
        let mut entry = StreamerConfig::new("https://kick.com/sxb")
            .with_tags(["rp"])
            .with_character("Abdulsamad | Mansour");
        entry.notify = true;
        let roster = Roster::new(vec![entry]).unwrap();

        let snapshot = aggregate(&fetcher, &roster).await;
        let channel = snapshot.get("sxb").unwrap();
        assert_eq!(channel.display_name, "SXB");
        assert!(channel.tags.contains("rp"));
        assert_eq!(channel.primary_character(), Some("Abdulsamad"));
        assert!(channel.notify_default);
    }

    #[tokio::test]
    async fn test_checked_at_taken_after_fetches() {
        let api = FakeApi::default()
            .with_channel("slow", offline_payload("slow"))
            .with_latency("slow", Duration::from_millis(30));
        let fetcher = ChannelFetcher::new(api);
        let roster = roster(&[("slow", &[])]);

        let before = Utc::now();
        let snapshot = aggregate(&fetcher, &roster).await;
        assert!(snapshot.checked_at >= before + chrono::Duration::milliseconds(30));
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let fetcher = ChannelFetcher::new(FakeApi::default());
        let snapshot = aggregate(&fetcher, &Roster::default()).await;
        assert!(snapshot.is_empty());
    }
}
