use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{Result, WeatherMuseError};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub clock: ClockConfig,
}

impl AppConfig {
    /// Parses a JSON document. Missing sections and fields fall back to
    /// their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.audio.validate()?;
        self.clock.validate()
    }
}

/// Configuration specific to the ambient audio subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Steady-state volume of the ambient track, in `[0, 1]`.
    pub target_volume: f32,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    /// Fade applied when the user mutes.
    pub mute_fade_ms: u64,
    /// Number of discrete volume steps per fade.
    pub fade_steps: u32,
    /// Directory the track sources are resolved against by file-backed hosts.
    pub sound_dir: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_volume: 0.2,
            fade_in_ms: 2000,
            fade_out_ms: 1200,
            mute_fade_ms: 300,
            fade_steps: 25,
            sound_dir: "sounds".to_string(),
        }
    }
}

impl AudioConfig {
    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn mute_fade(&self) -> Duration {
        Duration::from_millis(self.mute_fade_ms)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.target_volume) {
            return Err(WeatherMuseError::Config(format!(
                "audio.target_volume must be within [0, 1], got {}",
                self.target_volume
            )));
        }
        if self.fade_steps == 0 {
            return Err(WeatherMuseError::Config(
                "audio.fade_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Cadences of the low-frequency timers and the width of the twilight
/// windows around sunrise and sunset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Half-width of the sunrise and sunset windows.
    pub phase_window_secs: i64,
    pub phase_check_secs: u64,
    pub audio_recheck_secs: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            phase_window_secs: 3600,
            phase_check_secs: 60,
            audio_recheck_secs: 600,
        }
    }
}

impl ClockConfig {
    pub fn phase_check(&self) -> Duration {
        Duration::from_secs(self.phase_check_secs)
    }

    pub fn audio_recheck(&self) -> Duration {
        Duration::from_secs(self.audio_recheck_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.phase_window_secs < 0 {
            return Err(WeatherMuseError::Config(
                "clock.phase_window_secs must not be negative".to_string(),
            ));
        }
        if self.phase_check_secs == 0 || self.audio_recheck_secs == 0 {
            return Err(WeatherMuseError::Config(
                "clock intervals must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.audio.fade_steps, 25);
        assert_eq!(config.clock.audio_recheck(), Duration::from_secs(600));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config =
            AppConfig::from_json_str(r#"{ "audio": { "fade_in_ms": 500 } }"#).unwrap();
        assert_eq!(config.audio.fade_in(), Duration::from_millis(500));
        assert_eq!(config.audio.fade_out_ms, 1200);
        assert_eq!(config.clock.phase_window_secs, 3600);
    }

    #[test]
    fn rejects_zero_fade_steps() {
        let err = AppConfig::from_json_str(r#"{ "audio": { "fade_steps": 0 } }"#).unwrap_err();
        assert!(matches!(err, WeatherMuseError::Config(_)));
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let err =
            AppConfig::from_json_str(r#"{ "audio": { "target_volume": 1.5 } }"#).unwrap_err();
        assert!(format!("{err}").contains("target_volume"));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "clock": {{ "phase_check_secs": 30 }} }}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.clock.phase_check(), Duration::from_secs(30));
    }
}
