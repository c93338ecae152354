use std::{cell::Cell, path::PathBuf, rc::Rc};

use weathermuse_core::{AmbientStream, AudioBackend, AudioTrack, PlaybackError};

/// Audio backend for headless runs. Streams are not decoded; their lifecycle
/// and volume ramps are reported through `tracing`.
#[derive(Debug)]
pub struct TracingBackend {
    sound_dir: PathBuf,
    require_files: bool,
    /// Set once the host has seen a user gesture. Until then, with autoplay
    /// blocking enabled, `play` is refused.
    gesture_seen: Rc<Cell<bool>>,
    block_autoplay: bool,
}

impl TracingBackend {
    pub fn new(sound_dir: impl Into<PathBuf>, gesture_seen: Rc<Cell<bool>>) -> Self {
        Self {
            sound_dir: sound_dir.into(),
            require_files: false,
            gesture_seen,
            block_autoplay: false,
        }
    }

    /// Refuse tracks whose file is missing from the sound directory.
    pub fn require_files(mut self, require: bool) -> Self {
        self.require_files = require;
        self
    }

    /// Emulate a browser autoplay policy.
    pub fn block_autoplay(mut self, block: bool) -> Self {
        self.block_autoplay = block;
        self
    }
}

impl AudioBackend for TracingBackend {
    type Stream = TracingStream;

    fn open(&mut self, track: &AudioTrack) -> Result<Self::Stream, PlaybackError> {
        let path = self.sound_dir.join(track.source());
        if self.require_files && !path.is_file() {
            return Err(PlaybackError::unavailable(
                path.display().to_string(),
                "file not found",
            ));
        }

        tracing::info!(path = %path.display(), "stream opened");
        Ok(TracingStream {
            path,
            gesture_seen: self.block_autoplay.then(|| self.gesture_seen.clone()),
            volume: 0.0,
        })
    }
}

#[derive(Debug)]
pub struct TracingStream {
    path: PathBuf,
    gesture_seen: Option<Rc<Cell<bool>>>,
    volume: f32,
}

impl AmbientStream for TracingStream {
    fn play(&mut self) -> Result<(), PlaybackError> {
        if let Some(gesture_seen) = &self.gesture_seen {
            if !gesture_seen.get() {
                return Err(PlaybackError::Blocked);
            }
        }
        tracing::info!(path = %self.path.display(), "stream playing");
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        tracing::trace!(path = %self.path.display(), volume, "volume");
    }

    fn stop(&mut self) {
        tracing::info!(path = %self.path.display(), volume = self.volume, "stream stopped");
    }
}

#[cfg(test)]
mod tests {
    use weathermuse_core::AmbientSound;

    use super::*;

    #[test]
    fn blocks_until_a_gesture_is_seen() {
        let gesture = Rc::new(Cell::new(false));
        let mut backend = TracingBackend::new("sounds", gesture.clone()).block_autoplay(true);
        let mut stream = backend.open(&AudioTrack::new(AmbientSound::Rain)).unwrap();

        assert_eq!(stream.play(), Err(PlaybackError::Blocked));
        gesture.set(true);
        assert_eq!(stream.play(), Ok(()));
    }

    #[test]
    fn missing_files_are_unavailable_when_required() {
        let dir = std::env::temp_dir().join("weathermuse-no-such-dir");
        let mut backend = TracingBackend::new(dir, Rc::default()).require_files(true);
        let err = backend
            .open(&AudioTrack::new(AmbientSound::Birds))
            .unwrap_err();
        assert!(matches!(err, PlaybackError::SourceUnavailable { .. }));
    }
}
