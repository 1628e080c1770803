//! Typed access to Kick's public channel endpoints.
//!
//! The crate only knows about raw platform payloads. Normalizing them into
//! dashboard records is left to the caller.

pub mod client;
pub mod error;
pub mod models;
pub mod username;

pub use client::{DEFAULT_API_BASE, DEFAULT_SITE_BASE, KickClient, create_client_builder};
pub use error::KickError;
pub use models::{
    BannerImage, Category, ChannelResponse, Livestream, PreviousLivestream, User, Video,
    parse_timestamp,
};
pub use username::extract_username;
