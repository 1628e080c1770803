use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder, StatusCode};
use tracing::debug;
use url::Url;

use crate::error::KickError;
use crate::models::{ChannelResponse, Video, VideosPayload};

pub const DEFAULT_API_BASE: &str = "https://kick.com/api";
pub const DEFAULT_SITE_BASE: &str = "https://kick.com";

const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Build a `reqwest::ClientBuilder` with the headers Kick expects.
pub fn create_client_builder(timeout: Option<Duration>) -> ClientBuilder {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_UA));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let builder = Client::builder().default_headers(headers);
    match timeout {
        Some(timeout) if !timeout.is_zero() => builder.timeout(timeout),
        _ => builder,
    }
}

/// Read-only client for Kick's channel endpoints.
#[derive(Debug, Clone)]
pub struct KickClient {
    client: Client,
    api_base: Url,
}

impl KickClient {
    /// Create a client against the public API.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_base: Url::parse(DEFAULT_API_BASE).expect("default api base is a valid url"),
        }
    }

    /// Create a client against a custom API base, e.g. a proxy or a mock server.
    pub fn with_base_url(client: Client, api_base: &str) -> Result<Self, KickError> {
        let api_base =
            Url::parse(api_base).map_err(|_| KickError::InvalidUrl(api_base.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(KickError::InvalidUrl(api_base.to_string()));
        }
        Ok(Self { client, api_base })
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, KickError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| KickError::InvalidUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_text(&self, url: Url, username: &str) -> Result<String, KickError> {
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(KickError::NotFound(username.to_string()));
        }
        if !status.is_success() {
            return Err(KickError::Status {
                username: username.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Fetch the channel payload (profile, live session, followers, history).
    ///
    /// A payload without a `user` record is reported as [`KickError::MissingUser`].
    pub async fn channel(&self, username: &str) -> Result<ChannelResponse, KickError> {
        let slug = username.to_lowercase();
        let url = self.endpoint(&["v2", "channels", &slug])?;
        let body = self.get_text(url, username).await?;

        let response: ChannelResponse = serde_json::from_str(&body)?;
        if response.user.is_none() {
            return Err(KickError::MissingUser(username.to_string()));
        }
        Ok(response)
    }

    /// Fetch the channel's recent videos (past broadcasts).
    pub async fn recent_videos(&self, username: &str) -> Result<Vec<Video>, KickError> {
        let slug = username.to_lowercase();
        let url = self.endpoint(&["v2", "channels", &slug, "videos"])?;
        let body = self.get_text(url, username).await?;

        let payload: VideosPayload = serde_json::from_str(&body)?;
        Ok(payload.into_videos())
    }
}
