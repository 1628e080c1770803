//! User-controlled view state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sort mode for the channel list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Live by viewers, then offline by most recent stream.
    #[default]
    Status,
    /// Live by viewers, then offline by username.
    ViewersDesc,
    /// Longest running live streams first, then offline as in `Status`.
    LiveDurationDesc,
    /// Most recently started first: live by start time, then offline by
    /// most recent stream.
    LastSeenDesc,
}

/// Search, filter and sort selections. Passed by value on every recomputation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub search: String,
    /// Selected tags; a channel matches when it carries any of them.
    pub tags: BTreeSet<String>,
    pub category: Option<String>,
    pub sort: SortMode,
    pub favorites_only: bool,
}

impl ViewState {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn favorites_only(mut self) -> Self {
        self.favorites_only = true;
        self
    }

    /// Normalized search query, `None` when blank.
    pub(crate) fn query(&self) -> Option<String> {
        let query = self.search.trim().to_lowercase();
        (!query.is_empty()).then_some(query)
    }

    /// Selected category, `None` when blank.
    pub(crate) fn selected_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// Optional pipeline stages a front end opts into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewOptions {
    /// Enables the category stage.
    pub category_filter: bool,
    /// Usernames marked as favorite; used when `favorites_only` is set.
    pub favorites: BTreeSet<String>,
}

impl ViewOptions {
    /// Every optional stage enabled.
    pub fn full(favorites: BTreeSet<String>) -> Self {
        Self {
            category_filter: true,
            favorites,
        }
    }
}
