//! Status monitor service.
//!
//! The StatusMonitor runs the poll loop: aggregate the roster, replace the
//! current snapshot, detect transitions against the previous one and hand
//! them to the notification sink.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, Roster};
use crate::domain::AggregateSnapshot;
use crate::notification::NotificationSink;
use crate::{Error, Result};

use super::aggregator::aggregate;
use super::events::{MonitorEvent, MonitorEventBroadcaster};
use super::fetcher::{ChannelApi, ChannelFetcher};
use super::transition::{Transition, detect_transitions};

/// Configuration for the status monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    /// Upper bound for one tick; expiry fails the whole tick.
    pub tick_timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            tick_timeout: None,
        }
    }
}

impl From<&AppConfig> for MonitorConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            tick_timeout: config.tick_timeout(),
        }
    }
}

/// What a view renders: the current snapshot (possibly stale) and the
/// banner error of the last failed tick.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub snapshot: Option<Arc<AggregateSnapshot>>,
    pub error: Option<String>,
}

impl DashboardState {
    /// Whether the shown snapshot is older than the last attempt.
    pub fn is_stale(&self) -> bool {
        self.error.is_some() && self.snapshot.is_some()
    }
}

/// The poll service.
pub struct StatusMonitor<A> {
    fetcher: ChannelFetcher<A>,
    roster: Roster,
    sink: Arc<dyn NotificationSink>,
    config: MonitorConfig,
    /// Sole owner of the previous/current snapshot; replaced wholesale.
    state: RwLock<DashboardState>,
    event_broadcaster: MonitorEventBroadcaster,
}

impl<A: ChannelApi> StatusMonitor<A> {
    pub fn new(
        fetcher: ChannelFetcher<A>,
        roster: Roster,
        sink: Arc<dyn NotificationSink>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            fetcher,
            roster,
            sink,
            config,
            state: RwLock::new(DashboardState::default()),
            event_broadcaster: MonitorEventBroadcaster::new(),
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<MonitorEvent> {
        self.event_broadcaster.subscribe()
    }

    pub fn state(&self) -> DashboardState {
        self.state.read().clone()
    }

    pub fn snapshot(&self) -> Option<Arc<AggregateSnapshot>> {
        self.state.read().snapshot.clone()
    }

    /// Run one poll tick.
    ///
    /// On success the new snapshot becomes current and transitions are
    /// dispatched. On a whole-tick failure the previous snapshot stays
    /// current and the error is recorded for the dashboard.
    pub async fn tick(&self) -> Result<Arc<AggregateSnapshot>> {
        match self.poll().await {
            Ok(snapshot) => Ok(self.apply(snapshot).await),
            Err(e) => {
                warn!(error = %e, "Poll tick failed, keeping previous snapshot");
                self.state.write().error = Some(e.to_string());
                self.event_broadcaster.publish(MonitorEvent::PollFailed {
                    message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    async fn poll(&self) -> Result<AggregateSnapshot> {
        let aggregation = aggregate(&self.fetcher, &self.roster);
        match self.config.tick_timeout {
            Some(limit) => tokio::time::timeout(limit, aggregation)
                .await
                .map_err(|_| Error::Timeout(limit)),
            None => Ok(aggregation.await),
        }
    }

    async fn apply(&self, snapshot: AggregateSnapshot) -> Arc<AggregateSnapshot> {
        let snapshot = Arc::new(snapshot);
        let previous = {
            let mut state = self.state.write();
            state.error = None;
            state.snapshot.replace(Arc::clone(&snapshot))
        };

        let transitions = detect_transitions(previous.as_deref(), &snapshot);
        debug!(
            live = snapshot.live_count(),
            failed = snapshot.failed_count(),
            transitions = transitions.len(),
            "Snapshot updated"
        );

        self.event_broadcaster.publish(MonitorEvent::SnapshotUpdated {
            snapshot: Arc::clone(&snapshot),
        });

        for transition in &transitions {
            self.dispatch(transition).await;
        }

        snapshot
    }

    async fn dispatch(&self, transition: &Transition) {
        let channel = &transition.channel;
        info!(username = %channel.username, "{} went live", channel.display_name);

        self.event_broadcaster.publish(MonitorEvent::StreamerLive {
            username: channel.username.clone(),
            display_name: channel.display_name.clone(),
            title: transition.body.clone(),
            url: channel.live_url.clone(),
            category: channel.live_category.clone(),
            timestamp: Utc::now(),
        });

        if let Err(e) = self.sink.notify(&transition.notification()).await {
            warn!(
                username = %channel.username,
                sink = self.sink.name(),
                error = %e,
                "Failed to deliver notification"
            );
        }
    }

    /// Poll until cancelled.
    ///
    /// Ticks never overlap: the next interval tick is only awaited after the
    /// current one finished, and missed ticks are delayed rather than burst.
    /// Cancellation aborts an in-flight tick.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            streamers = self.roster.len(),
            interval_secs = self.config.poll_interval.as_secs(),
            "Status monitor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Cancelled during an in-flight tick");
                    break;
                }
                // Failures are already recorded in the dashboard state.
                _ = self.tick() => {}
            }
        }

        info!("Status monitor stopped");
    }
}
