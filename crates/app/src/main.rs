mod backend;

use std::{
    cell::Cell,
    path::{Path, PathBuf},
    rc::Rc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use weathermuse_core::{
    audio, phase, scene, AppConfig, EnvironmentController, FlashScheduler, HostClock, Phase,
    PreferenceStore, SceneConfig, SoundPreference, WeatherCondition, WeatherSnapshot,
};

use crate::backend::TracingBackend;

const TICK: Duration = Duration::from_millis(100);
/// Simulated user gesture that unblocks autoplay in `--blocked` runs.
const GESTURE_AT: Duration = Duration::from_secs(5);

fn main() -> weathermuse_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Scene {
            condition,
            phase,
            now,
            sunrise,
            sunset,
            offset,
            wind,
        } => {
            let phase = phase.unwrap_or_else(|| {
                phase::PhaseClock::new(config.clock.phase_window_secs)
                    .classify(now, sunrise, sunset, offset)
            });
            print_scene(condition, phase, wind)
        }
        Commands::Track { condition, phase } => {
            let track = audio::resolve(condition, phase);
            println!("{}", Path::new(&config.audio.sound_dir).join(track.source()).display());
            Ok(())
        }
        Commands::Sound { state, preferences } => {
            let store = PreferenceStore::new(preferences);
            store.save(SoundPreference {
                enabled: state == SoundState::On,
            })?;
            tracing::info!(path = %store.path().display(), ?state, "sound preference saved");
            Ok(())
        }
        Commands::Simulate(args) => run_simulation(&config, args),
    }
}

fn print_scene(condition: WeatherCondition, phase: Phase, wind: f32) -> weathermuse_core::Result<()> {
    let scene = scene::select(condition, phase, wind);
    tracing::info!(?condition, ?phase, wind, "selected scene");
    println!("{}", serde_json::to_string_pretty(&scene)?);
    Ok(())
}

fn run_simulation(config: &AppConfig, args: SimulateArgs) -> weathermuse_core::Result<()> {
    let raw = std::fs::read_to_string(&args.weather)?;
    let snapshot = WeatherSnapshot::from_openweather_json(&raw)?;
    let start = args.start.unwrap_or_else(unix_now);
    tracing::info!(weather = %args.weather.display(), start, minutes = args.minutes, "starting simulation");

    let enabled = match (&args.preferences, args.muted) {
        (_, true) => false,
        (Some(path), false) => PreferenceStore::new(path).load().enabled,
        (None, false) => SoundPreference::default().enabled,
    };

    let gesture_seen = Rc::new(Cell::new(false));
    let backend = TracingBackend::new(&config.audio.sound_dir, gesture_seen.clone())
        .require_files(args.require_sources)
        .block_autoplay(args.blocked);

    let latest_scene: Rc<Cell<Option<SceneConfig>>> = Rc::default();
    let presenter = {
        let latest_scene = latest_scene.clone();
        move |scene: &SceneConfig| {
            tracing::info!(
                gradient = %scene.gradient.css(),
                particles = ?scene.particles.kind,
                density = scene.particles.density,
                haze = scene.overlays.haze.is_some(),
                lightning = scene.overlays.lightning.is_some(),
                clouds = scene.overlays.clouds.map(|c| c.sprites),
                leaves = scene.overlays.leaves,
                creature = scene.overlays.nocturnal_creature,
                "scene presented"
            );
            latest_scene.set(Some(*scene));
        }
    };

    let mut clock = HostClock::starting_at(start);
    let mut controller = EnvironmentController::new(backend, presenter, config);
    controller.set_sound_enabled(enabled);
    controller.on_clock(clock.epoch_secs(), clock.elapsed());
    controller.on_weather(snapshot);

    let mut flashes: Option<FlashScheduler> = None;
    let mut was_lit = false;
    let total = Duration::from_secs(args.minutes.saturating_mul(60));

    while clock.elapsed() < total {
        clock.advance(TICK);
        let now = clock.elapsed();

        if args.blocked && !gesture_seen.get() && now >= GESTURE_AT {
            tracing::info!("user interaction");
            gesture_seen.set(true);
            controller.notify_user_interaction();
        }

        controller.on_clock(clock.epoch_secs(), now);

        let lightning = latest_scene.get().and_then(|scene| scene.overlays.lightning);
        flashes = match (flashes.take(), lightning) {
            (Some(scheduler), Some(_)) => Some(scheduler),
            (None, Some(overlay)) => Some(match args.seed {
                Some(seed) => FlashScheduler::seeded(overlay, seed, now),
                None => FlashScheduler::new(overlay, now),
            }),
            (_, None) => None,
        };
        if let Some(scheduler) = flashes.as_mut() {
            let lit = scheduler.poll(now);
            if lit && !was_lit {
                tracing::debug!(flash = scheduler.flashes(), "lightning flash");
            }
            was_lit = lit;
        }
    }

    tracing::info!(
        phase = ?controller.phase(),
        track = ?controller.engine().active_track().map(|t| t.source()),
        volume = controller.engine().volume(),
        sun = ?controller.sun_progress(),
        flashes = flashes.as_ref().map(FlashScheduler::flashes).unwrap_or(0),
        "simulation finished"
    );
    controller.shutdown();
    Ok(())
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Weather-driven ambient scenes and soundscapes", long_about = None)]
struct Cli {
    /// JSON configuration file; defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the scene for a condition as JSON.
    Scene {
        #[arg(long)]
        condition: WeatherCondition,
        /// Explicit phase. When omitted it is derived from the sun times.
        #[arg(long)]
        phase: Option<Phase>,
        /// Current time, epoch seconds.
        #[arg(long)]
        now: Option<i64>,
        #[arg(long)]
        sunrise: Option<i64>,
        #[arg(long)]
        sunset: Option<i64>,
        /// Timezone offset of the location in seconds.
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        offset: i64,
        #[arg(long, default_value_t = 0.0)]
        wind: f32,
    },
    /// Print the ambient track for a condition and phase.
    Track {
        #[arg(long)]
        condition: WeatherCondition,
        #[arg(long)]
        phase: Phase,
    },
    /// Persist the sound on/off preference.
    Sound {
        #[arg(value_enum)]
        state: SoundState,
        #[arg(long, default_value = "weathermuse-sound.json")]
        preferences: PathBuf,
    },
    /// Drive the environment controller with a virtual clock.
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    /// OpenWeather current-weather JSON payload.
    #[arg(long)]
    weather: PathBuf,
    #[arg(long, default_value_t = 15)]
    minutes: u64,
    /// Simulation start, epoch seconds. Defaults to now.
    #[arg(long)]
    start: Option<i64>,
    /// Sound preference file restored at startup.
    #[arg(long)]
    preferences: Option<PathBuf>,
    /// Start muted regardless of the stored preference.
    #[arg(long)]
    muted: bool,
    /// Refuse playback until a simulated user gesture.
    #[arg(long)]
    blocked: bool,
    /// Drop tracks whose file is missing from the sound directory.
    #[arg(long)]
    require_sources: bool,
    /// Seed for the lightning scheduler.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum SoundState {
    On,
    Off,
}
