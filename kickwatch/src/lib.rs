//! kickwatch - live status dashboard core for a roster of Kick streamers.
//!
//! Polls Kick's channel API for a fixed roster, merges the responses with the
//! roster's curated metadata, detects streamers going live and derives the
//! ordered, filtered list a front end renders.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod view;

pub use error::{Error, Result};
