//! Status monitoring.
//!
//! This module polls the roster's channels and tracks their live status:
//! - `fetcher`: one channel, normalized, never failing
//! - `aggregator`: concurrent fan-out in roster order
//! - `transition`: offline→live detection between snapshots
//! - `service`: the poll loop owning the current snapshot

mod aggregator;
mod events;
mod fetcher;
mod service;
mod transition;

pub use aggregator::aggregate;
pub use events::{MonitorEvent, MonitorEventBroadcaster};
pub use fetcher::{ChannelApi, ChannelFetcher, FetchOptions};
pub use service::{DashboardState, MonitorConfig, StatusMonitor};
pub use transition::{Transition, detect_transitions};
