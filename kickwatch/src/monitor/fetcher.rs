//! Per-channel fetch and normalization.
//!
//! A fetch never fails from the caller's point of view: any error on the
//! primary request becomes a failure-flagged [`ChannelSnapshot`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kick_api::{ChannelResponse, KickClient, KickError, Video};
use tracing::{debug, warn};

use crate::domain::ChannelSnapshot;

/// Read access to the platform's channel endpoints.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    /// Primary channel payload.
    async fn channel(&self, username: &str) -> Result<ChannelResponse, KickError>;

    /// Recent broadcasts, used to find the last stream time of offline channels.
    async fn recent_videos(&self, username: &str) -> Result<Vec<Video>, KickError>;
}

#[async_trait]
impl ChannelApi for KickClient {
    async fn channel(&self, username: &str) -> Result<ChannelResponse, KickError> {
        KickClient::channel(self, username).await
    }

    async fn recent_videos(&self, username: &str) -> Result<Vec<Video>, KickError> {
        KickClient::recent_videos(self, username).await
    }
}

/// Options for channel normalization.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Base URL used for the canonical live/profile links.
    pub site_base_url: String,
    /// Whether to consult the videos endpoint for offline channels.
    pub recent_videos_lookup: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            site_base_url: kick_api::DEFAULT_SITE_BASE.to_string(),
            recent_videos_lookup: true,
        }
    }
}

/// Fetches one channel and normalizes the platform payload.
pub struct ChannelFetcher<A> {
    api: A,
    options: FetchOptions,
}

impl<A: ChannelApi> ChannelFetcher<A> {
    pub fn new(api: A) -> Self {
        Self::with_options(api, FetchOptions::default())
    }

    pub fn with_options(api: A, options: FetchOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Resolve `identifier` (username or profile URL) and fetch its snapshot.
    pub async fn fetch(&self, identifier: &str) -> ChannelSnapshot {
        let username = kick_api::extract_username(identifier);

        match self.try_fetch(&username).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                if e.is_not_found() {
                    warn!(username = %username, "Channel does not exist");
                } else {
                    warn!(username = %username, error = %e, "Failed to fetch channel");
                }
                ChannelSnapshot::failed(username, &self.options.site_base_url, Utc::now())
            }
        }
    }

    async fn try_fetch(&self, username: &str) -> Result<ChannelSnapshot, KickError> {
        let response = self.api.channel(username).await?;
        let Some(user) = response.user.as_ref() else {
            return Err(KickError::MissingUser(username.to_string()));
        };

        let mut snapshot = ChannelSnapshot::offline(username, &self.options.site_base_url);
        if let Some(name) = non_empty(Some(&user.username)) {
            snapshot.display_name = name;
        }
        snapshot.profile_pic = non_empty(user.profile_pic.as_ref());
        snapshot.bio = non_empty(user.bio.as_ref());
        snapshot.followers_count = response.followers_count;
        snapshot.banner_image = response
            .banner_image
            .as_ref()
            .and_then(|b| non_empty(b.url.as_ref()));

        match response.livestream.as_ref().filter(|live| live.is_on_air()) {
            Some(live) => {
                snapshot.is_live = true;
                snapshot.live_title = non_empty(live.session_title.as_ref());
                snapshot.viewer_count = live.viewer_count;
                snapshot.live_since = live.started_at();
                snapshot.live_category = live.category_name().map(str::to_string);
            }
            None => {
                snapshot.last_stream_start_time = self.last_stream_start(username, &response).await;
            }
        }

        debug!(
            username = %username,
            is_live = snapshot.is_live,
            viewers = ?snapshot.viewer_count,
            "Fetched channel"
        );
        Ok(snapshot)
    }

    /// Best-effort last stream time: recent videos first, then the payload's
    /// own broadcast history.
    async fn last_stream_start(
        &self,
        username: &str,
        response: &ChannelResponse,
    ) -> Option<DateTime<Utc>> {
        if self.options.recent_videos_lookup {
            match self.api.recent_videos(username).await {
                Ok(videos) => {
                    if let Some(started_at) = Video::most_recent(&videos) {
                        return Some(started_at);
                    }
                }
                Err(e) => {
                    debug!(username = %username, error = %e, "Recent videos lookup failed");
                }
            }
        }

        response.most_recent_previous_start()
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
