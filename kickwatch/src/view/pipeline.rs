//! Sort → category → tags → favorites → search.
//!
//! Filters only remove entries, so the relative order established by the
//! sort survives every later stage.

use std::cmp::Ordering;

use crate::domain::ChannelSnapshot;

use super::state::{SortMode, ViewOptions, ViewState};

/// Derive the ordered, filtered list a view renders.
pub fn apply<'a>(
    channels: &'a [ChannelSnapshot],
    state: &ViewState,
    options: &ViewOptions,
) -> Vec<&'a ChannelSnapshot> {
    let mut view: Vec<&ChannelSnapshot> = channels.iter().collect();
    sort(&mut view, state.sort);

    if options.category_filter
        && let Some(category) = state.selected_category()
    {
        view.retain(|c| c.is_live && c.live_category.as_deref() == Some(category));
    }

    if !state.tags.is_empty() {
        view.retain(|c| c.tags.iter().any(|t| state.tags.contains(t)));
    }

    if state.favorites_only {
        view.retain(|c| options.favorites.contains(&c.username));
    }

    if let Some(query) = state.query() {
        view.retain(|c| matches_query(c, &query));
    }

    view
}

/// Stable sort; ties keep their input order.
pub fn sort(channels: &mut [&ChannelSnapshot], mode: SortMode) {
    match mode {
        SortMode::Status => channels.sort_by(|a, b| by_status(a, b)),
        SortMode::ViewersDesc => channels.sort_by(|a, b| by_viewers(a, b)),
        SortMode::LiveDurationDesc => channels.sort_by(|a, b| by_live_duration(a, b)),
        SortMode::LastSeenDesc => channels.sort_by(|a, b| by_last_seen(a, b)),
    }
}

fn live_first(a: &ChannelSnapshot, b: &ChannelSnapshot) -> Ordering {
    b.is_live.cmp(&a.is_live)
}

fn viewers_desc(a: &ChannelSnapshot, b: &ChannelSnapshot) -> Ordering {
    b.viewer_count.unwrap_or(0).cmp(&a.viewer_count.unwrap_or(0))
}

// `None` compares below any time, so descending puts unknown last.
fn last_stream_desc(a: &ChannelSnapshot, b: &ChannelSnapshot) -> Ordering {
    b.last_stream_start_time.cmp(&a.last_stream_start_time)
}

fn by_status(a: &ChannelSnapshot, b: &ChannelSnapshot) -> Ordering {
    live_first(a, b).then_with(|| {
        if a.is_live {
            viewers_desc(a, b)
        } else {
            last_stream_desc(a, b)
        }
    })
}

fn by_viewers(a: &ChannelSnapshot, b: &ChannelSnapshot) -> Ordering {
    live_first(a, b).then_with(|| {
        if a.is_live {
            viewers_desc(a, b)
        } else {
            a.username.to_lowercase().cmp(&b.username.to_lowercase())
        }
    })
}

fn by_last_seen(a: &ChannelSnapshot, b: &ChannelSnapshot) -> Ordering {
    live_first(a, b).then_with(|| {
        if a.is_live {
            b.live_since.cmp(&a.live_since)
        } else {
            last_stream_desc(a, b)
        }
    })
}

fn by_live_duration(a: &ChannelSnapshot, b: &ChannelSnapshot) -> Ordering {
    live_first(a, b).then_with(|| {
        if a.is_live {
            match (a.live_since, b.live_since) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        } else {
            last_stream_desc(a, b)
        }
    })
}

fn matches_query(channel: &ChannelSnapshot, query: &str) -> bool {
    if channel.username.to_lowercase().contains(query) {
        return true;
    }
    if channel
        .primary_character()
        .is_some_and(|c| c.to_lowercase().contains(query))
    {
        return true;
    }
    channel.is_live
        && channel
            .live_title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(query))
}
