//! Visual scene selection: maps a weather condition, solar phase and wind
//! speed onto the gradient, particle profile and overlays the presentation
//! layer draws. Selection is pure so the renderer can diff consecutive
//! configs to detect changes.

use serde::Serialize;

use crate::{Phase, WeatherCondition};

pub const HAZE_LAYERS: usize = 3;
/// Shortest allowed haze drift cycle.
pub const HAZE_MIN_DRIFT_SECS: f32 = 25.0;
pub const MAX_CLOUD_SPRITES: u32 = 8;
const MIN_CLOUD_SPRITES: u32 = 5;
const CLOUD_MIN_DRIFT_SECS: f32 = 35.0;

/// Background gradients, one per palette variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gradient {
    Sunrise,
    Day,
    Sunset,
    Night,
    Snow,
    RainDay,
    RainNight,
    Storm,
    HazeDay,
    HazeNight,
    CloudsDay,
    CloudsNight,
}

impl Gradient {
    /// Top and bottom colour stops.
    pub fn stops(self) -> [&'static str; 2] {
        match self {
            Gradient::Sunrise => ["#ffb347", "#ffd194"],
            Gradient::Day => ["#87ceeb", "#e0ffff"],
            Gradient::Sunset => ["#ff9966", "#ff5e62"],
            Gradient::Night => ["#060819", "#1a237e"],
            Gradient::Snow => ["#e8f6ff", "#c3d8ef"],
            Gradient::RainDay => ["#4b6584", "#2d3436"],
            Gradient::RainNight => ["#1b2330", "#0d1117"],
            Gradient::Storm => ["#232526", "#414345"],
            Gradient::HazeDay => ["#cfd8dc", "#9ea7aa"],
            Gradient::HazeNight => ["#080a14", "#20242f"],
            Gradient::CloudsDay => ["#a0b6cc", "#d5dee9"],
            Gradient::CloudsNight => ["#242b3a", "#3b475b"],
        }
    }

    pub fn css(self) -> String {
        let [top, bottom] = self.stops();
        format!("linear-gradient(180deg, {top} 0%, {bottom} 100%)")
    }

    fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Sunrise => Gradient::Sunrise,
            Phase::Day => Gradient::Day,
            Phase::Sunset => Gradient::Sunset,
            Phase::Night => Gradient::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleKind {
    None,
    Snow,
    Rain,
    Stars,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    Circle,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleMotion {
    Still,
    /// Downward, with per-particle jitter.
    Falling,
    /// Downward in straight lines.
    Streaking,
    /// Slow random wander.
    Drifting,
}

/// Inclusive lower and upper bound of a per-particle quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }
}

/// Emitter for rare streaks crossing a clear night sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShootingStars {
    pub interval_secs: f32,
    pub speed: Bounds,
    pub life_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParticleProfile {
    pub kind: ParticleKind,
    pub shape: ParticleShape,
    pub motion: ParticleMotion,
    pub color: &'static str,
    pub density: u32,
    pub speed: Bounds,
    pub size: Bounds,
    pub opacity: Bounds,
    /// Animate opacity between its bounds.
    pub twinkle: bool,
    pub shooting_stars: Option<ShootingStars>,
}

impl ParticleProfile {
    pub const fn none() -> Self {
        Self {
            kind: ParticleKind::None,
            shape: ParticleShape::Circle,
            motion: ParticleMotion::Still,
            color: "#ffffff",
            density: 0,
            speed: Bounds::fixed(0.0),
            size: Bounds::fixed(0.0),
            opacity: Bounds::fixed(0.0),
            twinkle: false,
            shooting_stars: None,
        }
    }

    fn snow() -> Self {
        Self {
            kind: ParticleKind::Snow,
            motion: ParticleMotion::Falling,
            density: 350,
            speed: Bounds::new(0.8, 1.3),
            size: Bounds::new(1.5, 3.0),
            opacity: Bounds::new(0.5, 0.9),
            ..Self::none()
        }
    }

    fn rain() -> Self {
        Self {
            kind: ParticleKind::Rain,
            shape: ParticleShape::Line,
            motion: ParticleMotion::Streaking,
            color: "#9ecfff",
            density: 250,
            speed: Bounds::fixed(20.0),
            size: Bounds::fixed(1.2),
            opacity: Bounds::fixed(0.65),
            ..Self::none()
        }
    }

    fn starfield() -> Self {
        Self {
            kind: ParticleKind::Stars,
            motion: ParticleMotion::Drifting,
            density: 120,
            speed: Bounds::new(0.0, 0.05),
            size: Bounds::new(0.6, 1.8),
            opacity: Bounds::new(0.4, 1.0),
            twinkle: true,
            shooting_stars: Some(ShootingStars {
                interval_secs: 5.0,
                speed: Bounds::new(30.0, 60.0),
                life_secs: 0.8,
            }),
            ..Self::none()
        }
    }
}

/// One band of the layered haze overlay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazeLayer {
    /// Vertical offset of the band, as a percentage of the viewport.
    pub top_percent: f32,
    pub opacity: f32,
    pub blur_px: f32,
    /// Seconds for one full drift across the viewport; wind shortens it down
    /// to [`HAZE_MIN_DRIFT_SECS`].
    pub drift_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HazeOverlay {
    pub tint: &'static str,
    pub layers: [HazeLayer; HAZE_LAYERS],
}

/// Periodic full-screen flashes. The gap between flashes is drawn uniformly
/// from `[min_interval_ms, max_interval_ms)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LightningOverlay {
    pub min_interval_ms: u64,
    pub max_interval_ms: u64,
    pub flash_ms: u64,
}

impl Default for LightningOverlay {
    fn default() -> Self {
        Self {
            min_interval_ms: 3_000,
            max_interval_ms: 9_000,
            flash_ms: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CloudOverlay {
    pub sprites: u32,
    pub drift_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Overlays {
    pub haze: Option<HazeOverlay>,
    pub lightning: Option<LightningOverlay>,
    pub clouds: Option<CloudOverlay>,
    pub leaves: bool,
    pub nocturnal_creature: bool,
    pub sun_glow: bool,
}

/// Resolved visual parameters for one condition/phase/wind triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneConfig {
    pub gradient: Gradient,
    pub particles: ParticleProfile,
    pub overlays: Overlays,
}

/// Selects the scene for the given inputs. The first matching rule wins:
/// snow, rain, thunderstorm, haze, clouds, then the phase's base palette.
pub fn select(condition: WeatherCondition, phase: Phase, wind_speed: f32) -> SceneConfig {
    let wind = calm(wind_speed);
    let night = phase.is_night();
    let mut overlays = Overlays {
        haze: None,
        lightning: None,
        clouds: None,
        leaves: false,
        nocturnal_creature: false,
        sun_glow: !night,
    };

    let (gradient, particles) = match condition {
        WeatherCondition::Snow => (Gradient::Snow, ParticleProfile::snow()),
        WeatherCondition::Rain | WeatherCondition::Drizzle => {
            let gradient = if night { Gradient::RainNight } else { Gradient::RainDay };
            (gradient, ParticleProfile::rain())
        }
        WeatherCondition::Thunderstorm => {
            overlays.lightning = Some(LightningOverlay::default());
            (Gradient::Storm, ParticleProfile::none())
        }
        c if c.is_hazy() => {
            overlays.haze = Some(haze_overlay(night, wind));
            let gradient = if night { Gradient::HazeNight } else { Gradient::HazeDay };
            (gradient, ParticleProfile::none())
        }
        WeatherCondition::Clouds => {
            overlays.clouds = Some(cloud_overlay(wind));
            let gradient = if night { Gradient::CloudsNight } else { Gradient::CloudsDay };
            (gradient, ParticleProfile::none())
        }
        _ => {
            let clear = condition == WeatherCondition::Clear;
            let particles = if clear && night {
                overlays.nocturnal_creature = true;
                ParticleProfile::starfield()
            } else {
                ParticleProfile::none()
            };
            overlays.leaves = clear && phase == Phase::Day;
            (Gradient::for_phase(phase), particles)
        }
    };

    SceneConfig {
        gradient,
        particles,
        overlays,
    }
}

fn calm(wind_speed: f32) -> f32 {
    if wind_speed.is_finite() {
        wind_speed.max(0.0)
    } else {
        0.0
    }
}

fn haze_overlay(night: bool, wind: f32) -> HazeOverlay {
    let layer = |index: usize| {
        let i = index as f32;
        HazeLayer {
            top_percent: 30.0 * i,
            opacity: 0.35 + 0.05 * i,
            blur_px: 70.0 + 30.0 * i,
            drift_secs: (45.0 + 15.0 * i - wind * 2.0).max(HAZE_MIN_DRIFT_SECS),
        }
    };

    HazeOverlay {
        tint: if night {
            "rgba(160, 160, 180, 0.25)"
        } else {
            "rgba(200, 200, 190, 0.45)"
        },
        layers: std::array::from_fn(layer),
    }
}

fn cloud_overlay(wind: f32) -> CloudOverlay {
    let gusts = (wind / 3.0).floor().min(MAX_CLOUD_SPRITES as f32) as u32;
    CloudOverlay {
        sprites: (MIN_CLOUD_SPRITES + gusts).min(MAX_CLOUD_SPRITES),
        drift_secs: (80.0 - wind * 4.0).max(CLOUD_MIN_DRIFT_SECS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASES: [Phase; 4] = [Phase::Day, Phase::Night, Phase::Sunrise, Phase::Sunset];

    #[test]
    fn selection_is_referentially_stable() {
        let first = select(WeatherCondition::Mist, Phase::Sunset, 4.2);
        let second = select(WeatherCondition::Mist, Phase::Sunset, 4.2);
        assert_eq!(first, second);
    }

    #[test]
    fn snow_wins_regardless_of_phase() {
        for phase in PHASES {
            let scene = select(WeatherCondition::Snow, phase, 12.0);
            assert_eq!(scene.gradient, Gradient::Snow);
            assert_eq!(scene.particles.kind, ParticleKind::Snow);
            assert!(scene.particles.density >= 300);
            assert!(!scene.overlays.leaves);
        }
    }

    #[test]
    fn rain_darkens_at_night() {
        let day = select(WeatherCondition::Drizzle, Phase::Day, 0.0);
        let night = select(WeatherCondition::Rain, Phase::Night, 0.0);
        assert_eq!(day.gradient, Gradient::RainDay);
        assert_eq!(night.gradient, Gradient::RainNight);
        assert_eq!(night.particles.shape, ParticleShape::Line);
        assert!(night.particles.speed.min >= 10.0);
    }

    #[test]
    fn thunderstorm_always_flashes() {
        for phase in PHASES {
            let lightning = select(WeatherCondition::Thunderstorm, phase, 0.0)
                .overlays
                .lightning
                .expect("storm scenes carry the flash overlay");
            assert_eq!(lightning.flash_ms, 120);
            let mean = (lightning.min_interval_ms + lightning.max_interval_ms) / 2;
            assert!((3_000..=9_000).contains(&mean));
        }
    }

    #[test]
    fn calm_night_fog_keeps_haze_drifting() {
        let scene = select(WeatherCondition::Fog, Phase::Night, 0.0);
        let haze = scene.overlays.haze.expect("fog renders haze bands");
        assert_eq!(haze.layers.len(), HAZE_LAYERS);
        for layer in haze.layers {
            assert!(layer.drift_secs >= HAZE_MIN_DRIFT_SECS);
        }
    }

    #[test]
    fn haze_layers_thicken_with_depth_and_speed_up_in_wind() {
        let calm = select(WeatherCondition::Smoke, Phase::Day, 0.0).overlays.haze.unwrap();
        let windy = select(WeatherCondition::Smoke, Phase::Day, 30.0).overlays.haze.unwrap();

        for pair in calm.layers.windows(2) {
            assert!(pair[1].opacity > pair[0].opacity);
            assert!(pair[1].blur_px > pair[0].blur_px);
        }
        for (c, w) in calm.layers.iter().zip(windy.layers.iter()) {
            assert!(w.drift_secs <= c.drift_secs);
            assert!(w.drift_secs >= HAZE_MIN_DRIFT_SECS);
        }
    }

    #[test]
    fn cloud_sprites_scale_with_wind_up_to_cap() {
        let still = select(WeatherCondition::Clouds, Phase::Day, 0.0);
        let breezy = select(WeatherCondition::Clouds, Phase::Day, 6.5);
        let gale = select(WeatherCondition::Clouds, Phase::Night, 80.0);

        assert_eq!(still.overlays.clouds.unwrap().sprites, 5);
        assert_eq!(breezy.overlays.clouds.unwrap().sprites, 7);
        assert_eq!(gale.overlays.clouds.unwrap().sprites, MAX_CLOUD_SPRITES);
        assert_eq!(gale.gradient, Gradient::CloudsNight);
    }

    #[test]
    fn clear_night_shows_stars_and_no_leaves() {
        let scene = select(WeatherCondition::Clear, Phase::Night, 2.0);
        assert_eq!(scene.gradient, Gradient::Night);
        assert_eq!(scene.particles.kind, ParticleKind::Stars);
        assert_eq!(scene.particles.density, 120);
        assert!(scene.particles.twinkle);
        assert_eq!(scene.particles.shooting_stars.unwrap().interval_secs, 5.0);
        assert!(scene.overlays.nocturnal_creature);
        assert!(!scene.overlays.leaves);
        assert!(!scene.overlays.sun_glow);
    }

    #[test]
    fn clear_day_drops_leaves() {
        let scene = select(WeatherCondition::Clear, Phase::Day, 2.0);
        assert_eq!(scene.gradient, Gradient::Day);
        assert!(scene.overlays.leaves);
        assert!(scene.overlays.sun_glow);
        assert_eq!(scene.particles.kind, ParticleKind::None);
    }

    #[test]
    fn unmatched_conditions_use_phase_palette() {
        let sunrise = select(WeatherCondition::Other, Phase::Sunrise, 0.0);
        assert_eq!(sunrise.gradient, Gradient::Sunrise);
        assert!(!sunrise.overlays.leaves);
        let night = select(WeatherCondition::Other, Phase::Night, 0.0);
        assert_eq!(night.particles.kind, ParticleKind::None);
        assert!(!night.overlays.nocturnal_creature);
    }

    #[test]
    fn invalid_wind_is_treated_as_calm() {
        assert_eq!(
            select(WeatherCondition::Clouds, Phase::Day, f32::NAN),
            select(WeatherCondition::Clouds, Phase::Day, 0.0)
        );
        assert_eq!(
            select(WeatherCondition::Haze, Phase::Day, -4.0),
            select(WeatherCondition::Haze, Phase::Day, 0.0)
        );
    }

    #[test]
    fn gradient_renders_css() {
        assert_eq!(
            Gradient::Storm.css(),
            "linear-gradient(180deg, #232526 0%, #414345 100%)"
        );
    }
}
