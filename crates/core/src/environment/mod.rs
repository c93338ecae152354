//! Orchestrates the ambient environment: derives the phase from the latest
//! weather snapshot and wall clock, publishes the matching scene, and keeps
//! the crossfade engine on the matching track.

use std::time::Duration;

use tracing::{debug, info};

use crate::{
    audio, phase, scene, AppConfig, AudioCrossfadeEngine, AudioBackend, IntervalTimer, Phase,
    PhaseClock, SceneConfig, WeatherSnapshot,
};

/// Receives every new [`SceneConfig`]. Called only when the scene differs
/// from the previously presented one.
pub trait ScenePresenter {
    fn present(&mut self, scene: &SceneConfig);
}

impl<F> ScenePresenter for F
where
    F: FnMut(&SceneConfig),
{
    fn present(&mut self, scene: &SceneConfig) {
        self(scene)
    }
}

pub struct EnvironmentController<B: AudioBackend, P: ScenePresenter> {
    engine: AudioCrossfadeEngine<B>,
    presenter: P,
    phase_clock: PhaseClock,
    weather: Option<WeatherSnapshot>,
    wall_clock: Option<i64>,
    phase: Phase,
    scene: Option<SceneConfig>,
    phase_timer: IntervalTimer,
    audio_timer: IntervalTimer,
}

impl<B: AudioBackend, P: ScenePresenter> EnvironmentController<B, P> {
    pub fn new(backend: B, presenter: P, config: &AppConfig) -> Self {
        Self {
            engine: AudioCrossfadeEngine::new(backend, config.audio.clone()),
            presenter,
            phase_clock: PhaseClock::new(config.clock.phase_window_secs),
            weather: None,
            wall_clock: None,
            phase: Phase::Day,
            scene: None,
            phase_timer: IntervalTimer::new(config.clock.phase_check()),
            audio_timer: IntervalTimer::new(config.clock.audio_recheck()),
        }
    }

    /// Applies a fresh weather report and refreshes scene and soundtrack.
    pub fn on_weather(&mut self, snapshot: WeatherSnapshot) {
        info!(condition = ?snapshot.condition, wind = snapshot.wind_speed, "weather updated");
        self.weather = Some(snapshot);
        self.refresh();
    }

    /// Clock tick from the host, at one hertz or faster. `epoch_secs` is the
    /// wall clock, `elapsed` the monotonic time driving fades.
    pub fn on_clock(&mut self, epoch_secs: i64, elapsed: Duration) {
        self.wall_clock = Some(epoch_secs);
        self.engine.advance(elapsed);

        if self.phase_timer.poll(elapsed) {
            self.refresh();
        }
        if self.audio_timer.poll(elapsed) {
            self.recheck_audio();
        }
    }

    /// Recomputes phase, scene and track from the current inputs. Repeating
    /// the call with unchanged inputs neither restarts audio nor presents
    /// the scene again.
    pub fn refresh(&mut self) {
        let Some(phase) = self.current_phase() else {
            return;
        };
        let Some(weather) = self.weather.as_ref() else {
            return;
        };

        if phase != self.phase {
            info!(from = ?self.phase, to = ?phase, "solar phase changed");
            self.phase = phase;
        }

        let scene = scene::select(weather.condition, phase, weather.wind_speed);
        let track = audio::resolve(weather.condition, phase);
        self.engine.request_track(track);

        if self.scene.as_ref() != Some(&scene) {
            debug!(gradient = ?scene.gradient, particles = ?scene.particles.kind, "presenting scene");
            self.presenter.present(&scene);
            self.scene = Some(scene);
        }
    }

    /// Mirrors the user's mute toggle onto the engine.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.engine.set_enabled(enabled);
    }

    pub fn notify_user_interaction(&mut self) {
        self.engine.notify_user_interaction();
    }

    /// Releases audio and cancels outstanding fades.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scene(&self) -> Option<&SceneConfig> {
        self.scene.as_ref()
    }

    /// Sun position for the sun-glow overlay, see [`phase::sun_progress`].
    pub fn sun_progress(&self) -> Option<f32> {
        let weather = self.weather.as_ref()?;
        phase::sun_progress(
            self.wall_clock,
            weather.sunrise,
            weather.sunset,
            weather.timezone_offset,
        )
    }

    pub fn engine(&self) -> &AudioCrossfadeEngine<B> {
        &self.engine
    }

    /// Phase at the latest wall-clock tick, or `None` before any weather.
    fn current_phase(&self) -> Option<Phase> {
        let weather = self.weather.as_ref()?;
        Some(self.phase_clock.classify(
            self.wall_clock,
            weather.sunrise,
            weather.sunset,
            weather.timezone_offset,
        ))
    }

    /// Re-derives the phase and re-requests the track. The scene is left to
    /// the phase check.
    fn recheck_audio(&mut self) {
        let (Some(phase), Some(weather)) = (self.current_phase(), self.weather.as_ref()) else {
            return;
        };
        let track = audio::resolve(weather.condition, phase);
        debug!(%track, ?phase, "periodic audio re-evaluation");
        self.engine.request_track(track);
    }
}
