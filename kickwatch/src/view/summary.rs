//! Derived figures shown next to the channel list.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::config::Roster;
use crate::domain::{AggregateSnapshot, ChannelSnapshot};

/// Sorted, de-duplicated tags of the whole roster.
pub fn all_tags(roster: &Roster) -> Vec<String> {
    roster
        .iter()
        .flat_map(|entry| entry.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Number of roster entries per tag, counting only entries that appear in the
/// snapshot. Usernames are compared case-insensitively.
pub fn tag_counts(roster: &Roster, snapshot: &AggregateSnapshot) -> BTreeMap<String, usize> {
    let present: HashSet<String> = snapshot
        .channels
        .iter()
        .map(|c| c.username.to_lowercase())
        .collect();

    let mut counts = BTreeMap::new();
    for entry in roster.iter() {
        if !present.contains(&entry.resolved_username().to_lowercase()) {
            continue;
        }
        for tag in &entry.tags {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Live/offline split of a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewSummary {
    pub live: usize,
    pub offline: usize,
}

impl ViewSummary {
    pub fn of(view: &[&ChannelSnapshot]) -> Self {
        let live = view.iter().filter(|c| c.is_live).count();
        Self {
            live,
            offline: view.len() - live,
        }
    }

    pub fn total(&self) -> usize {
        self.live + self.offline
    }
}

/// Newline-joined links for the share action: live URLs of the live channels
/// when any channel in the view is live, every profile URL otherwise.
pub fn share_text(view: &[&ChannelSnapshot]) -> String {
    let urls: Vec<&str> = if view.iter().any(|c| c.is_live) {
        view.iter()
            .filter(|c| c.is_live)
            .map(|c| c.live_url.as_str())
            .collect()
    } else {
        view.iter().map(|c| c.profile_url.as_str()).collect()
    };
    urls.join("\n")
}
