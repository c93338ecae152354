use serde::{Deserialize, Serialize};

/// Discrete solar-time classification used to theme visuals and audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Day,
    Night,
    Sunrise,
    Sunset,
}

impl Phase {
    pub fn is_night(self) -> bool {
        self == Phase::Night
    }
}

impl std::str::FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Phase::Day),
            "night" => Ok(Phase::Night),
            "sunrise" => Ok(Phase::Sunrise),
            "sunset" => Ok(Phase::Sunset),
            other => Err(format!("unknown phase `{other}`")),
        }
    }
}

/// Classifies instants against the twilight windows around sunrise and
/// sunset. Stateless; the window width is the only parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseClock {
    window_secs: i64,
}

impl Default for PhaseClock {
    fn default() -> Self {
        Self::new(3600)
    }
}

impl PhaseClock {
    pub fn new(window_secs: i64) -> Self {
        Self {
            window_secs: window_secs.max(0),
        }
    }

    /// Classifies `current` (epoch seconds) against the day's sunrise and
    /// sunset. Any missing instant fails open to [`Phase::Day`].
    pub fn classify(
        &self,
        current: Option<i64>,
        sunrise: Option<i64>,
        sunset: Option<i64>,
        timezone_offset: i64,
    ) -> Phase {
        let (Some(current), Some(sunrise), Some(sunset)) = (current, sunrise, sunset) else {
            return Phase::Day;
        };

        let now = current.saturating_add(timezone_offset);
        let sunrise = sunrise.saturating_add(timezone_offset);
        let sunset = sunset.saturating_add(timezone_offset);

        let sunrise_start = sunrise.saturating_sub(self.window_secs);
        let sunrise_end = sunrise.saturating_add(self.window_secs);
        let sunset_start = sunset.saturating_sub(self.window_secs);
        let sunset_end = sunset.saturating_add(self.window_secs);

        if now < sunrise_start || now > sunset_end {
            Phase::Night
        } else if now <= sunrise_end {
            Phase::Sunrise
        } else if now >= sunset_start {
            Phase::Sunset
        } else {
            Phase::Day
        }
    }
}

/// [`PhaseClock::classify`] with the default one-hour window.
pub fn classify(
    current: Option<i64>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    timezone_offset: i64,
) -> Phase {
    PhaseClock::default().classify(current, sunrise, sunset, timezone_offset)
}

/// Position of the sun between sunrise (0.0) and sunset (1.0), clamped.
///
/// Drives the horizontal placement of the sun-glow overlay. Returns `None`
/// when an instant is missing or the sun times are inverted.
pub fn sun_progress(
    current: Option<i64>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
    timezone_offset: i64,
) -> Option<f32> {
    let (current, sunrise, sunset) = (current?, sunrise?, sunset?);
    if sunset <= sunrise {
        return None;
    }
    // Widened before any arithmetic so extreme instants cannot overflow.
    let offset = timezone_offset as f64;
    let now = current as f64 + offset;
    let sunrise = sunrise as f64 + offset;
    let sunset = sunset as f64 + offset;

    let progress = (now - sunrise) / (sunset - sunrise);
    if !progress.is_finite() {
        return None;
    }
    Some(progress.clamp(0.0, 1.0) as f32)
}
