//! Offline→live transition detection between consecutive snapshots.

use std::collections::HashMap;

use crate::domain::{AggregateSnapshot, ChannelSnapshot};
use crate::notification::LiveNotification;

/// A channel that went live since the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub channel: ChannelSnapshot,
    /// Notification body: the live title, or a generic "now live" line.
    pub body: String,
}

impl Transition {
    fn new(channel: &ChannelSnapshot) -> Self {
        let body = channel
            .live_title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} is now live!", channel.display_name));
        Self {
            channel: channel.clone(),
            body,
        }
    }

    pub fn username(&self) -> &str {
        &self.channel.username
    }

    pub fn notification(&self) -> LiveNotification {
        LiveNotification {
            username: self.channel.username.clone(),
            title: self.channel.display_name.clone(),
            body: self.body.clone(),
            icon_url: self.channel.profile_pic.clone(),
            url: self.channel.live_url.clone(),
        }
    }
}

/// Channels live in `current` that were offline, or missing, in `previous`.
///
/// Nothing fires without a previous snapshot, so the first poll never
/// notifies for channels that were already live.
pub fn detect_transitions(
    previous: Option<&AggregateSnapshot>,
    current: &AggregateSnapshot,
) -> Vec<Transition> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let was_live: HashMap<&str, bool> = previous
        .channels
        .iter()
        .map(|c| (c.username.as_str(), c.is_live))
        .collect();

    current
        .channels
        .iter()
        .filter(|c| c.is_live)
        .filter(|c| !was_live.get(c.username.as_str()).copied().unwrap_or(false))
        .map(Transition::new)
        .collect()
}
