//! Domain records shared by the monitor and the view.

mod snapshot;

pub use snapshot::{AggregateSnapshot, ChannelSnapshot, channel_url};
