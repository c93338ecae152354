//! Weather inputs consumed from the host: the provider's condition category
//! and the snapshot fields the ambient engine reads.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Provider weather categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Rain,
    Drizzle,
    Thunderstorm,
    Snow,
    Mist,
    Fog,
    Haze,
    Smoke,
    Other,
}

impl WeatherCondition {
    /// Maps a provider category name (`weather[0].main`) onto a condition.
    /// Matching ignores case; unknown categories become [`WeatherCondition::Other`].
    pub fn from_provider(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" | "cloudy" => Self::Clouds,
            "rain" => Self::Rain,
            "drizzle" => Self::Drizzle,
            "thunderstorm" => Self::Thunderstorm,
            "snow" => Self::Snow,
            "mist" => Self::Mist,
            "fog" => Self::Fog,
            "haze" => Self::Haze,
            "smoke" => Self::Smoke,
            _ => Self::Other,
        }
    }

    /// Conditions rendered with drifting haze bands.
    pub fn is_hazy(self) -> bool {
        matches!(self, Self::Fog | Self::Mist | Self::Haze | Self::Smoke)
    }
}

impl std::str::FromStr for WeatherCondition {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_provider(s))
    }
}

/// The subset of a weather report that drives the ambient environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition: WeatherCondition,
    /// Wind speed in the provider's units (m/s for metric).
    pub wind_speed: f32,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    /// Offset of the viewed location from UTC, in seconds.
    pub timezone_offset: i64,
}

impl WeatherSnapshot {
    pub fn new(condition: WeatherCondition) -> Self {
        Self {
            condition,
            wind_speed: 0.0,
            sunrise: None,
            sunset: None,
            timezone_offset: 0,
        }
    }

    /// Extracts a snapshot from an OpenWeather current-weather response.
    pub fn from_openweather_json(json: &str) -> Result<Self> {
        let payload: OpenWeatherPayload = serde_json::from_str(json)?;
        let condition = payload
            .weather
            .first()
            .map(|entry| WeatherCondition::from_provider(&entry.main))
            .unwrap_or(WeatherCondition::Other);

        Ok(Self {
            condition,
            wind_speed: payload.wind.map(|wind| wind.speed).unwrap_or(0.0),
            sunrise: payload.sys.as_ref().and_then(|sys| sys.sunrise),
            sunset: payload.sys.as_ref().and_then(|sys| sys.sunset),
            timezone_offset: payload.timezone.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenWeatherPayload {
    #[serde(default)]
    weather: Vec<OpenWeatherEntry>,
    wind: Option<OpenWeatherWind>,
    sys: Option<OpenWeatherSys>,
    timezone: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherEntry {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    #[serde(default)]
    speed: f32,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherSys {
    sunrise: Option<i64>,
    sunset: Option<i64>,
}
