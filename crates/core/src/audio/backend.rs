use crate::{AudioTrack, PlaybackError};

/// Platform audio output. Opening a stream materializes it (source loaded,
/// silent, not yet playing).
pub trait AudioBackend {
    type Stream: AmbientStream;

    fn open(&mut self, track: &AudioTrack) -> Result<Self::Stream, PlaybackError>;
}

/// A single looping ambient stream. Dropping a stream releases it; callers
/// stop it first.
pub trait AmbientStream {
    /// Starts looping playback. May be refused with [`PlaybackError::Blocked`]
    /// until the user has interacted with the host.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn set_volume(&mut self, volume: f32);

    fn stop(&mut self);
}
