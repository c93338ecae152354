use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::Result;

/// The user's persisted mute choice. Sound is on unless the user turned it
/// off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundPreference {
    pub enabled: bool,
}

impl Default for SoundPreference {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Older stores hold a bare boolean.
#[derive(Deserialize)]
#[serde(untagged)]
enum Stored {
    Flag(bool),
    Preference(SoundPreference),
}

/// JSON file holding the [`SoundPreference`] across sessions.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored preference. A missing or unreadable file yields the
    /// default.
    pub fn load(&self) -> SoundPreference {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return SoundPreference::default();
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "cannot read sound preference");
                return SoundPreference::default();
            }
        };

        match serde_json::from_str::<Stored>(&raw) {
            Ok(Stored::Flag(enabled)) => SoundPreference { enabled },
            Ok(Stored::Preference(preference)) => preference,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ignoring corrupt sound preference");
                SoundPreference::default()
            }
        }
    }

    pub fn save(&self, preference: SoundPreference) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&preference)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_defaults_to_sound_on() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("sound.json"));
        assert_eq!(store.load(), SoundPreference { enabled: true });
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("nested").join("sound.json"));
        store.save(SoundPreference { enabled: false }).unwrap();
        assert!(!store.load().enabled);
    }

    #[test]
    fn accepts_bare_boolean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sound.json");
        std::fs::write(&path, "false").unwrap();
        assert!(!PreferenceStore::new(&path).load().enabled);
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sound.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(PreferenceStore::new(&path).load().enabled);
    }
}
