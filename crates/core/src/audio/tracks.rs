use std::fmt;

use serde::Serialize;

use crate::{Phase, WeatherCondition};

/// The ambient loops shipped with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientSound {
    Birds,
    Crickets,
    Wind,
    Rain,
    Thunder,
}

impl AmbientSound {
    /// Source file, relative to the configured sound directory.
    pub fn source(self) -> &'static str {
        match self {
            AmbientSound::Birds => "birds.mp3",
            AmbientSound::Crickets => "crickets.mp3",
            AmbientSound::Wind => "wind.mp3",
            AmbientSound::Rain => "rain.mp3",
            AmbientSound::Thunder => "thunder.mp3",
        }
    }
}

/// A resolved ambient loop. Two tracks are the same track when they share a
/// source, even if they were resolved from different conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AudioTrack {
    pub sound: AmbientSound,
}

impl AudioTrack {
    pub const fn new(sound: AmbientSound) -> Self {
        Self { sound }
    }

    pub fn source(&self) -> &'static str {
        self.sound.source()
    }
}

impl fmt::Display for AudioTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}

/// Resolves the ambient track for a condition and phase. Sunrise and sunset
/// share the day table.
pub fn resolve(condition: WeatherCondition, phase: Phase) -> AudioTrack {
    let sound = if phase.is_night() {
        night_sound(condition).unwrap_or(AmbientSound::Crickets)
    } else {
        day_sound(condition).unwrap_or(AmbientSound::Birds)
    };
    AudioTrack::new(sound)
}

fn day_sound(condition: WeatherCondition) -> Option<AmbientSound> {
    use WeatherCondition::*;
    match condition {
        Clear => Some(AmbientSound::Birds),
        Clouds | Mist | Fog | Smoke | Snow => Some(AmbientSound::Wind),
        Rain | Haze => Some(AmbientSound::Rain),
        Thunderstorm => Some(AmbientSound::Thunder),
        Drizzle | Other => None,
    }
}

fn night_sound(condition: WeatherCondition) -> Option<AmbientSound> {
    use WeatherCondition::*;
    match condition {
        Clear => Some(AmbientSound::Crickets),
        Clouds | Mist | Fog | Smoke | Snow => Some(AmbientSound::Wind),
        Rain => Some(AmbientSound::Rain),
        Thunderstorm => Some(AmbientSound::Thunder),
        Drizzle | Haze | Other => None,
    }
}
