//! Monitor events.
//!
//! Emitted by the poll service after every tick for consumers such as the
//! CLI renderer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::domain::AggregateSnapshot;

/// Events emitted by the poll service.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    /// A tick completed and replaced the current snapshot.
    SnapshotUpdated {
        snapshot: Arc<AggregateSnapshot>,
    },
    /// Streamer went live since the previous tick.
    StreamerLive {
        username: String,
        display_name: String,
        title: String,
        url: String,
        category: Option<String>,
        timestamp: DateTime<Utc>,
    },
    /// The whole tick failed; the previous snapshot stays current.
    PollFailed {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl MonitorEvent {
    /// Get a human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            MonitorEvent::SnapshotUpdated { snapshot } => format!(
                "{} of {} channels live",
                snapshot.live_count(),
                snapshot.len()
            ),
            MonitorEvent::StreamerLive {
                display_name,
                title,
                ..
            } => format!("{} is now live: {}", display_name, title),
            MonitorEvent::PollFailed { message, .. } => format!("poll failed: {}", message),
        }
    }
}

/// Broadcaster for monitor events.
#[derive(Clone)]
pub struct MonitorEventBroadcaster {
    sender: broadcast::Sender<MonitorEvent>,
}

impl MonitorEventBroadcaster {
    /// Create a new broadcaster with default capacity (256).
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    /// Publish an event; returns the number of receivers, 0 when nobody listens.
    pub fn publish(&self, event: MonitorEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for MonitorEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let broadcaster = MonitorEventBroadcaster::new();
        let mut rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        let delivered = broadcaster.publish(MonitorEvent::PollFailed {
            message: "timeout".to_string(),
            timestamp: Utc::now(),
        });
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.description(), "poll failed: timeout");
    }

    #[test]
    fn test_publish_without_subscribers() {
        let broadcaster = MonitorEventBroadcaster::new();
        let delivered = broadcaster.publish(MonitorEvent::SnapshotUpdated {
            snapshot: Arc::new(AggregateSnapshot::new(Utc::now(), Vec::new())),
        });
        assert_eq!(delivered, 0);
    }
}
