//! Normalized channel records.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::StreamerConfig;

/// Normalized result of one fetch attempt for one channel, with the roster's
/// curated fields merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSnapshot {
    /// Resolved Kick username (roster key).
    pub username: String,
    pub display_name: String,
    pub profile_pic: Option<String>,
    pub is_live: bool,
    pub live_title: Option<String>,
    pub viewer_count: Option<u64>,
    pub live_since: Option<DateTime<Utc>>,
    /// Start of the most recent broadcast, only for offline channels.
    pub last_stream_start_time: Option<DateTime<Utc>>,
    pub live_url: String,
    pub profile_url: String,
    pub bio: Option<String>,
    pub followers_count: Option<u64>,
    pub banner_image: Option<String>,
    pub live_category: Option<String>,
    /// The fetch failed; content fields are empty.
    #[serde(default)]
    pub error: bool,
    /// When the failure snapshot was produced.
    pub last_checked_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub socials: BTreeMap<String, String>,
    #[serde(default)]
    pub notify_default: bool,
}

impl ChannelSnapshot {
    /// An offline record with identity fields only.
    pub fn offline(username: impl Into<String>, site_base: &str) -> Self {
        let username = username.into();
        let url = channel_url(site_base, &username);
        Self {
            display_name: username.clone(),
            username,
            profile_pic: None,
            is_live: false,
            live_title: None,
            viewer_count: None,
            live_since: None,
            last_stream_start_time: None,
            live_url: url.clone(),
            profile_url: url,
            bio: None,
            followers_count: None,
            banner_image: None,
            live_category: None,
            error: false,
            last_checked_at: None,
            tags: BTreeSet::new(),
            character: None,
            socials: BTreeMap::new(),
            notify_default: false,
        }
    }

    /// The stale record produced when a fetch fails.
    pub fn failed(username: impl Into<String>, site_base: &str, checked_at: DateTime<Utc>) -> Self {
        Self {
            error: true,
            last_checked_at: Some(checked_at),
            ..Self::offline(username, site_base)
        }
    }

    /// Merge the roster's curated fields into this record.
    pub fn merge_config(&mut self, config: &StreamerConfig) {
        self.tags = config.tags.clone();
        self.character = config.character.clone();
        self.socials = config.socials.clone();
        self.notify_default = config.notify;
    }

    /// First character name of a pipe-delimited `character` field, trimmed.
    pub fn primary_character(&self) -> Option<&str> {
        self.character
            .as_deref()
            .and_then(|c| c.split('|').next())
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Whether any content field carries data.
    pub fn has_content(&self) -> bool {
        self.profile_pic.is_some()
            || self.live_title.is_some()
            || self.viewer_count.is_some()
            || self.live_since.is_some()
            || self.last_stream_start_time.is_some()
            || self.bio.is_some()
            || self.followers_count.is_some()
            || self.banner_image.is_some()
            || self.live_category.is_some()
    }
}

/// One point-in-time result set for the whole roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub checked_at: DateTime<Utc>,
    /// One record per roster entry, in roster order.
    pub channels: Vec<ChannelSnapshot>,
}

impl AggregateSnapshot {
    pub fn new(checked_at: DateTime<Utc>, channels: Vec<ChannelSnapshot>) -> Self {
        Self {
            checked_at,
            channels,
        }
    }

    pub fn get(&self, username: &str) -> Option<&ChannelSnapshot> {
        self.channels.iter().find(|c| c.username == username)
    }

    pub fn live_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_live).count()
    }

    pub fn failed_count(&self) -> usize {
        self.channels.iter().filter(|c| c.error).count()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Canonical channel URL on the site.
pub fn channel_url(site_base: &str, username: &str) -> String {
    format!("{}/{}", site_base.trim_end_matches('/'), username)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_snapshot_shape() {
        let now = Utc::now();
        let snapshot = ChannelSnapshot::failed("sxb", "https://kick.com/", now);
        assert!(snapshot.error);
        assert!(!snapshot.is_live);
        assert!(!snapshot.has_content());
        assert_eq!(snapshot.last_checked_at, Some(now));
        assert_eq!(snapshot.display_name, "sxb");
        assert_eq!(snapshot.live_url, "https://kick.com/sxb");
        assert_eq!(snapshot.profile_url, "https://kick.com/sxb");
    }

    #[test]
    fn test_merge_config() {
        let config = StreamerConfig::new("sxb")
            .with_tags(["rp", "pvp"])
            .with_character("Abdulsamad | Mansour");
        let mut snapshot = ChannelSnapshot::offline("sxb", "https://kick.com");
        snapshot.merge_config(&config);

        assert_eq!(snapshot.tags.len(), 2);
        assert_eq!(snapshot.primary_character(), Some("Abdulsamad"));
    }

    #[test]
    fn test_primary_character_edge_cases() {
        let mut snapshot = ChannelSnapshot::offline("a", "https://kick.com");
        assert_eq!(snapshot.primary_character(), None);

        snapshot.character = Some("  Solo  ".to_string());
        assert_eq!(snapshot.primary_character(), Some("Solo"));

        snapshot.character = Some(" | Second".to_string());
        assert_eq!(snapshot.primary_character(), None);
    }

    #[test]
    fn test_aggregate_counts() {
        let mut live = ChannelSnapshot::offline("a", "https://kick.com");
        live.is_live = true;
        let failed = ChannelSnapshot::failed("b", "https://kick.com", Utc::now());
        let offline = ChannelSnapshot::offline("c", "https://kick.com");

        let snapshot = AggregateSnapshot::new(Utc::now(), vec![live, failed, offline]);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.live_count(), 1);
        assert_eq!(snapshot.failed_count(), 1);
        assert!(snapshot.get("b").is_some_and(|c| c.error));
        assert!(snapshot.get("B").is_none());
    }
}
