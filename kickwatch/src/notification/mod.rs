//! Live notifications.
//!
//! Transitions are delivered through a [`NotificationSink`]:
//! - [`LogSink`] writes them to the log
//! - [`WebhookSink`] POSTs them as JSON
//! - [`OptInSink`] forwards only for streamers the user opted into

mod preferences;
mod webhook;

pub use preferences::{
    JsonFilePreferenceStore, MemoryPreferenceStore, PREFERENCES_KEY, PreferenceStore,
    Preferences,
};
pub use webhook::{WebhookAuth, WebhookConfig, WebhookSink};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;

/// One "streamer went live" notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveNotification {
    /// Streamer the notification is about.
    pub username: String,
    pub title: String,
    pub body: String,
    pub icon_url: Option<String>,
    /// Where activating the notification leads.
    pub url: String,
}

/// Trait for notification sinks.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sink name, used in logs.
    fn name(&self) -> &'static str;

    /// Deliver a notification.
    async fn notify(&self, notification: &LiveNotification) -> Result<()>;
}

#[async_trait]
impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn notify(&self, notification: &LiveNotification) -> Result<()> {
        (**self).notify(notification).await
    }
}

/// Writes notifications to the log at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, notification: &LiveNotification) -> Result<()> {
        info!(
            username = %notification.username,
            url = %notification.url,
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}

/// Forwards to `inner` only when the preference store has the streamer
/// enabled.
pub struct OptInSink<S, P> {
    inner: S,
    preferences: Arc<P>,
}

impl<S, P> OptInSink<S, P> {
    pub fn new(inner: S, preferences: Arc<P>) -> Self {
        Self { inner, preferences }
    }
}

#[async_trait]
impl<S, P> NotificationSink for OptInSink<S, P>
where
    S: NotificationSink,
    P: PreferenceStore + 'static,
{
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn notify(&self, notification: &LiveNotification) -> Result<()> {
        if !self.preferences.get(&notification.username)? {
            debug!(username = %notification.username, "Notifications disabled, skipping");
            return Ok(());
        }
        self.inner.notify(notification).await
    }
}
