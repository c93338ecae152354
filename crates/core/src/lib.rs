//! Core library for WeatherMuse's ambient environment.
//!
//! The crate turns the weather at a viewed location into a mood: a visual
//! scene (gradient, particles, overlays) and a looping ambient soundtrack.
//! Each module owns one piece: solar phase classification, scene selection,
//! track resolution and the crossfade engine, with the environment
//! controller tying them to the host's weather updates and clock ticks.

pub mod audio;
pub mod config;
pub mod environment;
pub mod error;
pub mod phase;
pub mod preferences;
pub mod scene;
pub mod timeline;
pub mod weather;

pub use audio::{
    AmbientSound, AmbientStream, AudioBackend, AudioCrossfadeEngine, AudioTrack, FadeState,
};
pub use config::{AppConfig, AudioConfig, ClockConfig};
pub use environment::{EnvironmentController, ScenePresenter};
pub use error::{PlaybackError, Result, WeatherMuseError};
pub use phase::{Phase, PhaseClock};
pub use preferences::{PreferenceStore, SoundPreference};
pub use scene::{
    Gradient, HazeLayer, LightningOverlay, Overlays, ParticleKind, ParticleProfile, SceneConfig,
};
pub use timeline::{FlashScheduler, HostClock, IntervalTimer};
pub use weather::{WeatherCondition, WeatherSnapshot};
