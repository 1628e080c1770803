use thiserror::Error;

#[derive(Debug, Error)]
pub enum KickError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("channel not found: {0}")]
    NotFound(String),
    #[error("api error for {username}: {status}")]
    Status { username: String, status: u16 },
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("user data not found for: {0}")]
    MissingUser(String),
}

impl KickError {
    /// Whether the platform reported that the channel does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, KickError::NotFound(_))
    }
}
