//! Per-streamer notification preferences.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Roster;
use crate::{Error, Result};

/// Fixed key the preference map is stored under.
pub const PREFERENCES_KEY: &str = "streamerNotifications";

/// Username → notifications enabled.
pub type Preferences = BTreeMap<String, bool>;

/// Storage for notification preferences.
///
/// Streamers without a stored value have notifications disabled.
pub trait PreferenceStore: Send + Sync {
    fn get_all(&self) -> Result<Preferences>;

    /// Replace the whole map.
    fn set_all(&self, preferences: &Preferences) -> Result<()>;

    fn get(&self, username: &str) -> Result<bool> {
        Ok(self.get_all()?.get(username).copied().unwrap_or(false))
    }

    fn set(&self, username: &str, enabled: bool) -> Result<()> {
        let mut preferences = self.get_all()?;
        preferences.insert(username.to_string(), enabled);
        self.set_all(&preferences)
    }

    /// Flip the stored value; returns the new value.
    fn toggle(&self, username: &str) -> Result<bool> {
        let mut preferences = self.get_all()?;
        let enabled = !preferences.get(username).copied().unwrap_or(false);
        preferences.insert(username.to_string(), enabled);
        self.set_all(&preferences)?;
        Ok(enabled)
    }

    /// Store each roster entry's `notify` default unless the user already has
    /// a value for it. Returns how many entries were seeded.
    fn seed_defaults(&self, roster: &Roster) -> Result<usize> {
        let mut preferences = self.get_all()?;
        let mut seeded = 0;
        for entry in roster.iter() {
            let username = entry.resolved_username();
            if !preferences.contains_key(&username) {
                preferences.insert(username, entry.notify);
                seeded += 1;
            }
        }
        if seeded > 0 {
            self.set_all(&preferences)?;
        }
        Ok(seeded)
    }
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    preferences: RwLock<Preferences>,
}

impl MemoryPreferenceStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            preferences: RwLock::new(preferences),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_all(&self) -> Result<Preferences> {
        Ok(self.preferences.read().clone())
    }

    fn set_all(&self, preferences: &Preferences) -> Result<()> {
        *self.preferences.write() = preferences.clone();
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(rename = "streamerNotifications", default)]
    streamer_notifications: Preferences,
}

/// JSON file store.
///
/// Writes go to a temporary file in the same directory which then replaces
/// the target, so readers never observe a partial file.
#[derive(Debug)]
pub struct JsonFilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<Preferences> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Preferences::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<PreferenceFile>(&content) {
            Ok(file) => Ok(file.streamer_notifications),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Unreadable preference file, starting from empty preferences"
                );
                Ok(Preferences::new())
            }
        }
    }

    fn write_file(&self, preferences: &Preferences) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let file = PreferenceFile {
            streamer_notifications: preferences.clone(),
        };
        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut temp, &file)?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!(path = %self.path.display(), entries = preferences.len(), "Saved preferences");
        Ok(())
    }
}

impl PreferenceStore for JsonFilePreferenceStore {
    fn get_all(&self) -> Result<Preferences> {
        let _guard = self.write_lock.lock();
        self.read_file()
    }

    fn set_all(&self, preferences: &Preferences) -> Result<()> {
        let _guard = self.write_lock.lock();
        self.write_file(preferences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamerConfig;
    use rstest::rstest;

    fn roster() -> Roster {
        let mut on = StreamerConfig::new("on");
        on.notify = true;
        Roster::new(vec![on, StreamerConfig::new("off"), StreamerConfig::new("kept")]).unwrap()
    }

    #[test]
    fn test_memory_store_toggle() {
        let store = MemoryPreferenceStore::default();
        assert!(!store.get("a").unwrap());
        assert!(store.toggle("a").unwrap());
        assert!(store.get("a").unwrap());
        assert!(!store.toggle("a").unwrap());
        assert_eq!(store.get_all().unwrap().get("a"), Some(&false));
    }

    #[test]
    fn test_seed_defaults_keeps_user_choices() {
        let store = MemoryPreferenceStore::new(Preferences::from([("kept".to_string(), true)]));

        assert_eq!(store.seed_defaults(&roster()).unwrap(), 2);
        assert!(store.get("on").unwrap());
        assert!(!store.get("off").unwrap());
        assert!(store.get("kept").unwrap());

        assert_eq!(store.seed_defaults(&roster()).unwrap(), 0);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("notifications.json");
        let store = JsonFilePreferenceStore::new(&path);

        assert!(store.get_all().unwrap().is_empty());
        store.set("sxb", true).unwrap();
        store.set("other", false).unwrap();

        let reopened = JsonFilePreferenceStore::new(&path);
        assert!(reopened.get("sxb").unwrap());
        assert!(!reopened.get("other").unwrap());

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[PREFERENCES_KEY]["sxb"], true);
    }

    #[rstest]
    #[case("")]
    #[case("not json")]
    #[case("[1, 2, 3]")]
    fn test_json_store_unreadable_file_is_empty(#[case] content: &str) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.json");
        std::fs::write(&path, content).unwrap();

        let store = JsonFilePreferenceStore::new(&path);
        assert!(store.get_all().unwrap().is_empty());

        store.toggle("sxb").unwrap();
        assert!(store.get("sxb").unwrap());
    }
}
