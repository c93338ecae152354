/// Result alias that carries the custom [`WeatherMuseError`] type.
pub type Result<T> = std::result::Result<T, WeatherMuseError>;

/// Common error type for the core crate.
///
/// Only configuration and host I/O surface these. The ambient engine itself
/// degrades to "no sound" or "default phase" instead of failing.
#[derive(Debug, thiserror::Error)]
pub enum WeatherMuseError {
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON in a config, preference or weather payload.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    /// Configuration parsed but carries values the engine cannot use.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Failures reported by an audio backend when materializing or starting a
/// stream. The crossfade engine absorbs these; they never reach the host.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The platform refused to start playback before a user gesture.
    #[error("playback blocked until user interaction")]
    Blocked,
    /// The track source could not be loaded or decoded.
    #[error("audio source `{path}` unavailable: {reason}")]
    SourceUnavailable { path: String, reason: String },
}

impl PlaybackError {
    pub fn unavailable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
