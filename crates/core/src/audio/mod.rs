mod backend;
mod fade;
pub mod tracks;

use std::{fmt, time::Duration};

use tracing::{debug, info, warn};

pub use backend::{AmbientStream, AudioBackend};
pub use fade::FadeState;
pub use tracks::{resolve, AmbientSound, AudioTrack};

use crate::{AudioConfig, PlaybackError};
use fade::{Fade, FadeKind};

/// The stream currently materialized by the backend and the track it plays.
#[derive(Debug)]
struct ActiveStream<S> {
    track: AudioTrack,
    stream: S,
}

/// Mutable playback state. Owned exclusively by [`AudioCrossfadeEngine`].
#[derive(Debug)]
struct PlaybackSession<S> {
    active: Option<ActiveStream<S>>,
    volume: f32,
    /// The one fade timer that may be alive.
    fade: Option<Fade>,
    enabled: bool,
    /// Playback was refused by autoplay policy and waits for a user gesture.
    pending_start: bool,
    last_requested: Option<AudioTrack>,
}

impl<S> Default for PlaybackSession<S> {
    fn default() -> Self {
        Self {
            active: None,
            volume: 0.0,
            fade: None,
            enabled: false,
            pending_start: false,
            last_requested: None,
        }
    }
}

/// Keeps exactly one ambient loop audible, crossfading between tracks as
/// they are requested.
///
/// The engine is cooperative: it never sleeps or spawns. The host calls
/// [`advance`](Self::advance) with a monotonic timestamp at a steady rate and
/// every pending fade step whose deadline has passed is applied. Operations
/// schedule new fades relative to the last advanced instant.
///
/// A track switch fades the old stream out, stops and drops it, and only then
/// opens the new one, so at most one stream is ever materialized. Requests
/// arriving while a fade-out is in flight replace its successor instead of
/// starting a second fade. A fade-in in flight is cancelled by a request for
/// another track.
pub struct AudioCrossfadeEngine<B: AudioBackend> {
    backend: B,
    config: AudioConfig,
    session: PlaybackSession<B::Stream>,
    now: Duration,
}

impl<B: AudioBackend> AudioCrossfadeEngine<B> {
    /// Creates an idle engine. Sound stays disabled until the host restores
    /// the user's preference through [`set_enabled`](Self::set_enabled).
    pub fn new(backend: B, config: AudioConfig) -> Self {
        Self {
            backend,
            config,
            session: PlaybackSession::default(),
            now: Duration::ZERO,
        }
    }

    /// Requests that `track` becomes the audible ambient loop.
    ///
    /// Requesting the track that is already playing (or fading in) is a
    /// no-op. While sound is disabled the track is only remembered.
    pub fn request_track(&mut self, track: AudioTrack) {
        self.session.last_requested = Some(track);
        if !self.session.enabled {
            debug!(%track, "sound disabled, remembering requested track");
            return;
        }
        self.transition_to(track);
    }

    /// Mutes or unmutes the ambient soundtrack.
    ///
    /// Muting fades the active stream out quickly and releases it. Unmuting
    /// resumes the most recently requested track from silence.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.session.enabled == enabled {
            return;
        }
        self.session.enabled = enabled;
        info!(enabled, "ambient sound toggled");

        if enabled {
            if let Some(track) = self.session.last_requested {
                self.transition_to(track);
            }
        } else if self.session.pending_start {
            self.release();
        } else if self.session.active.is_some() {
            self.begin_fade(FadeKind::OutThenRelease, 0.0, self.config.mute_fade());
        }
    }

    /// Signals a qualifying user gesture. Retries a start that autoplay
    /// policy refused and fades it in from silence.
    pub fn notify_user_interaction(&mut self) {
        if !self.session.pending_start {
            return;
        }
        let Some(active) = self.session.active.as_mut() else {
            self.session.pending_start = false;
            return;
        };

        match active.stream.play() {
            Ok(()) => {
                info!(track = %active.track, "deferred playback started");
                active.stream.set_volume(0.0);
                self.session.volume = 0.0;
                self.session.pending_start = false;
                self.begin_fade(FadeKind::In, self.config.target_volume, self.config.fade_in());
            }
            Err(PlaybackError::Blocked) => {
                debug!(track = %active.track, "playback still blocked");
            }
            Err(err) => {
                warn!(%err, "deferred playback failed, dropping track");
                self.release();
            }
        }
    }

    /// Applies every fade step due at `now`. Time never runs backwards;
    /// an earlier timestamp is ignored.
    pub fn advance(&mut self, now: Duration) {
        self.now = self.now.max(now);

        while let Some(fade) = self.session.fade.as_mut() {
            if !fade.is_due(self.now) {
                break;
            }
            let volume = fade.step();
            let finished = fade.is_complete();
            self.apply_volume(volume);

            if finished {
                if let Some(fade) = self.session.fade.take() {
                    self.complete(fade.kind);
                }
            }
        }
    }

    /// Stops the active stream and cancels any fade. The last requested
    /// track is kept so a later re-enable can resume it.
    pub fn shutdown(&mut self) {
        self.release();
        self.session.enabled = false;
        info!("ambient audio shut down");
    }

    pub fn fade_state(&self) -> FadeState {
        self.session
            .fade
            .as_ref()
            .map(Fade::state)
            .unwrap_or(FadeState::Idle)
    }

    pub fn volume(&self) -> f32 {
        self.session.volume
    }

    pub fn active_track(&self) -> Option<AudioTrack> {
        self.session.active.as_ref().map(|active| active.track)
    }

    pub fn last_requested(&self) -> Option<AudioTrack> {
        self.session.last_requested
    }

    pub fn is_enabled(&self) -> bool {
        self.session.enabled
    }

    pub fn pending_start(&self) -> bool {
        self.session.pending_start
    }

    /// Number of fade timers alive. Never more than one.
    pub fn active_fade_timers(&self) -> usize {
        usize::from(self.session.fade.is_some())
    }

    fn transition_to(&mut self, track: AudioTrack) {
        let Some(active) = self.session.active.as_ref() else {
            self.start(track);
            return;
        };
        let current = active.track;

        if let Some(fade) = self.session.fade.as_mut() {
            if fade.state() == FadeState::FadingOut {
                debug!(%track, "fade-out in flight, deferring request");
                fade.kind = FadeKind::OutThenSwitch(track);
                return;
            }
        }

        if current == track {
            debug!(%track, "track already playing, ignoring request");
        } else if self.session.pending_start {
            self.release();
            self.start(track);
        } else {
            info!(from = %current, to = %track, "crossfading ambient track");
            self.begin_fade(FadeKind::OutThenSwitch(track), 0.0, self.config.fade_out());
        }
    }

    /// Opens and starts `track` from silence. Requires that no stream is
    /// materialized.
    fn start(&mut self, track: AudioTrack) {
        debug_assert!(self.session.active.is_none());

        let mut stream = match self.backend.open(&track) {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%track, %err, "ambient track unavailable, dropping request");
                return;
            }
        };
        stream.set_volume(0.0);
        self.session.volume = 0.0;

        match stream.play() {
            Ok(()) => {
                info!(%track, "ambient track started");
                self.session.active = Some(ActiveStream { track, stream });
                self.begin_fade(FadeKind::In, self.config.target_volume, self.config.fade_in());
            }
            Err(PlaybackError::Blocked) => {
                warn!(%track, "autoplay blocked, waiting for user interaction");
                self.session.active = Some(ActiveStream { track, stream });
                self.session.pending_start = true;
            }
            Err(err) => {
                warn!(%track, %err, "ambient track failed to start, dropping request");
                stream.stop();
            }
        }
    }

    /// Replaces any in-flight fade with a new one starting at the current
    /// volume.
    fn begin_fade(&mut self, kind: FadeKind, to: f32, duration: Duration) {
        let fade = Fade::new(
            kind,
            self.session.volume,
            to,
            duration,
            self.config.fade_steps,
            self.now,
        );
        if let Some(cancelled) = self.session.fade.replace(fade) {
            debug!(
                remaining = cancelled.remaining_steps(),
                "cancelled in-flight fade"
            );
        }
    }

    fn complete(&mut self, kind: FadeKind) {
        match kind {
            FadeKind::In => debug!("fade-in complete"),
            FadeKind::OutThenSwitch(next) => {
                self.release();
                if self.session.enabled {
                    self.start(next);
                }
            }
            FadeKind::OutThenRelease => self.release(),
        }
    }

    fn apply_volume(&mut self, volume: f32) {
        self.session.volume = volume;
        if let Some(active) = self.session.active.as_mut() {
            active.stream.set_volume(volume);
        }
    }

    /// Stops and drops the active stream and cancels any fade.
    fn release(&mut self) {
        self.session.fade = None;
        self.session.pending_start = false;
        self.session.volume = 0.0;
        if let Some(mut active) = self.session.active.take() {
            active.stream.stop();
            debug!(track = %active.track, "released ambient stream");
        }
    }
}

impl<B: AudioBackend> fmt::Debug for AudioCrossfadeEngine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioCrossfadeEngine")
            .field("enabled", &self.session.enabled)
            .field("active_track", &self.active_track())
            .field("volume", &self.session.volume)
            .field("fade_state", &self.fade_state())
            .field("pending_start", &self.session.pending_start)
            .field("now", &self.now)
            .finish()
    }
}

impl<B: AudioBackend> Drop for AudioCrossfadeEngine<B> {
    fn drop(&mut self) {
        self.release();
    }
}

/// In-memory backend that records stream lifecycles for assertions.
#[cfg(test)]
pub(crate) mod testing {
    use std::{cell::RefCell, collections::HashSet, rc::Rc};

    use super::{AmbientStream, AudioBackend};
    use crate::{AudioTrack, PlaybackError};

    #[derive(Debug, Default)]
    pub(crate) struct Ledger {
        pub plays: Vec<&'static str>,
        pub stops: usize,
        pub live: usize,
        pub max_live: usize,
        pub block_autoplay: bool,
        pub missing: HashSet<&'static str>,
        pub last_volume: Option<f32>,
    }

    #[derive(Debug, Clone, Default)]
    pub(crate) struct RecordingBackend {
        pub ledger: Rc<RefCell<Ledger>>,
    }

    impl RecordingBackend {
        pub(crate) fn live(&self) -> usize {
            self.ledger.borrow().live
        }

        pub(crate) fn plays(&self) -> Vec<&'static str> {
            self.ledger.borrow().plays.clone()
        }
    }

    #[derive(Debug)]
    pub(crate) struct RecordingStream {
        source: &'static str,
        ledger: Rc<RefCell<Ledger>>,
    }

    impl AudioBackend for RecordingBackend {
        type Stream = RecordingStream;

        fn open(&mut self, track: &AudioTrack) -> Result<Self::Stream, PlaybackError> {
            let mut ledger = self.ledger.borrow_mut();
            if ledger.missing.contains(track.source()) {
                return Err(PlaybackError::unavailable(track.source(), "file not found"));
            }
            ledger.live += 1;
            ledger.max_live = ledger.max_live.max(ledger.live);
            Ok(RecordingStream {
                source: track.source(),
                ledger: self.ledger.clone(),
            })
        }
    }

    impl AmbientStream for RecordingStream {
        fn play(&mut self) -> Result<(), PlaybackError> {
            let mut ledger = self.ledger.borrow_mut();
            if ledger.block_autoplay {
                return Err(PlaybackError::Blocked);
            }
            ledger.plays.push(self.source);
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.ledger.borrow_mut().last_volume = Some(volume);
        }

        fn stop(&mut self) {
            self.ledger.borrow_mut().stops += 1;
        }
    }

    impl Drop for RecordingStream {
        fn drop(&mut self) {
            self.ledger.borrow_mut().live -= 1;
        }
    }
}
