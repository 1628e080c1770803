//! Static streamer roster.
//!
//! The roster is read once at startup and never reloaded.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// One curated roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamerConfig {
    /// Kick username or full profile URL.
    pub username: String,
    /// Free-text tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Pipe-delimited character names, e.g. `"Abdulsamad | Mansour"`.
    #[serde(default)]
    pub character: Option<String>,
    /// Social handles keyed by platform.
    #[serde(default)]
    pub socials: BTreeMap<String, String>,
    /// Whether live notifications are on for this streamer until the user
    /// changes it.
    #[serde(default)]
    pub notify: bool,
}

impl StreamerConfig {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            tags: BTreeSet::new(),
            character: None,
            socials: BTreeMap::new(),
            notify: false,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    /// The bare Kick username this entry refers to.
    pub fn resolved_username(&self) -> String {
        kick_api::extract_username(&self.username)
    }
}

#[derive(Debug, Deserialize)]
struct RosterFile {
    #[serde(default)]
    streamers: Vec<StreamerConfig>,
}

/// The ordered list of tracked streamers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    entries: Vec<StreamerConfig>,
}

impl Roster {
    /// Build a roster, validating identifiers.
    pub fn new(entries: Vec<StreamerConfig>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            let username = entry.resolved_username();
            if username.is_empty() {
                return Err(Error::roster("roster entry with an empty username"));
            }
            if !seen.insert(username.clone()) {
                return Err(Error::roster(format!("duplicate streamer: {username}")));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a roster from TOML (`[[streamers]]` tables).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RosterFile = toml::from_str(content)?;
        if file.streamers.is_empty() {
            return Err(Error::roster("roster has no streamers"));
        }
        Self::new(file.streamers)
    }

    /// Load the roster file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::roster(format!("failed to read roster {}: {}", path.display(), e))
        })?;
        let roster = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), streamers = roster.len(), "Loaded roster");
        Ok(roster)
    }

    pub fn entries(&self) -> &[StreamerConfig] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &StreamerConfig> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find an entry by resolved username.
    pub fn find(&self, username: &str) -> Option<&StreamerConfig> {
        self.entries
            .iter()
            .find(|e| e.resolved_username() == username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROSTER: &str = r#"
        [[streamers]]
        username = "https://kick.com/sxb?ref=home"
        tags = ["rp", "pvp"]
        character = "Abdulsamad Alqurashi | Mansour"
        notify = true

        [streamers.socials]
        x = "@sxb"

        [[streamers]]
        username = "otherguy"
    "#;

    #[test]
    fn test_parse_roster() {
        let roster = Roster::from_toml_str(ROSTER).unwrap();
        assert_eq!(roster.len(), 2);

        let first = &roster.entries()[0];
        assert_eq!(first.resolved_username(), "sxb");
        assert!(first.tags.contains("rp"));
        assert!(first.notify);
        assert_eq!(first.socials.get("x").map(String::as_str), Some("@sxb"));

        let second = &roster.entries()[1];
        assert!(second.tags.is_empty());
        assert!(second.character.is_none());
        assert!(!second.notify);
    }

    #[test]
    fn test_find_by_resolved_username() {
        let roster = Roster::from_toml_str(ROSTER).unwrap();
        assert!(roster.find("sxb").is_some());
        assert!(roster.find("SXB").is_none());
    }

    #[test]
    fn test_empty_roster_is_rejected() {
        assert!(matches!(
            Roster::from_toml_str(""),
            Err(Error::Roster(_))
        ));
    }

    #[test]
    fn test_duplicate_usernames_are_rejected() {
        let entries = vec![
            StreamerConfig::new("sxb"),
            StreamerConfig::new("https://kick.com/sxb"),
        ];
        assert!(matches!(Roster::new(entries), Err(Error::Roster(_))));
    }

    #[test]
    fn test_blank_username_is_rejected() {
        let entries = vec![StreamerConfig::new("   ")];
        assert!(matches!(Roster::new(entries), Err(Error::Roster(_))));
    }
}
