use std::time::Duration;

use serde::Serialize;

use crate::AudioTrack;

/// Observable fade status of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FadeState {
    Idle,
    FadingOut,
    FadingIn,
}

/// What happens once a fade reaches its target volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FadeKind {
    In,
    /// Release the current stream, then start `next` from silence.
    OutThenSwitch(AudioTrack),
    /// Release the current stream and stay silent.
    OutThenRelease,
}

/// A linear volume ramp split into equal discrete steps. Dropping the value
/// cancels every remaining step.
#[derive(Debug, Clone)]
pub(crate) struct Fade {
    pub(crate) kind: FadeKind,
    from: f32,
    to: f32,
    steps: u32,
    taken: u32,
    interval: Duration,
    next_at: Duration,
}

impl Fade {
    pub(crate) fn new(
        kind: FadeKind,
        from: f32,
        to: f32,
        duration: Duration,
        steps: u32,
        now: Duration,
    ) -> Self {
        let steps = steps.max(1);
        let interval = duration / steps;
        Self {
            kind,
            from,
            to,
            steps,
            taken: 0,
            interval,
            next_at: now + interval,
        }
    }

    pub(crate) fn state(&self) -> FadeState {
        match self.kind {
            FadeKind::In => FadeState::FadingIn,
            FadeKind::OutThenSwitch(_) | FadeKind::OutThenRelease => FadeState::FadingOut,
        }
    }

    pub(crate) fn is_due(&self, now: Duration) -> bool {
        !self.is_complete() && now >= self.next_at
    }

    /// Takes one step and returns the volume to apply. The last step lands
    /// exactly on the target.
    pub(crate) fn step(&mut self) -> f32 {
        self.taken = (self.taken + 1).min(self.steps);
        self.next_at += self.interval;
        if self.is_complete() {
            self.to
        } else {
            let progress = self.taken as f32 / self.steps as f32;
            (self.from + (self.to - self.from) * progress).clamp(0.0, 1.0)
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.taken >= self.steps
    }

    pub(crate) fn remaining_steps(&self) -> u32 {
        self.steps - self.taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn ramps_linearly_and_clamps_on_the_last_step() {
        let mut fade = Fade::new(FadeKind::In, 0.0, 0.2, ms(2000), 25, ms(0));
        let mut volumes = Vec::new();
        let mut now = ms(0);
        while !fade.is_complete() {
            now += ms(80);
            assert!(fade.is_due(now));
            volumes.push(fade.step());
        }

        assert_eq!(volumes.len(), 25);
        assert!((volumes[0] - 0.008).abs() < 1e-6);
        for pair in volumes.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert_eq!(*volumes.last().unwrap(), 0.2);
    }

    #[test]
    fn steps_wait_for_their_interval() {
        let fade = Fade::new(FadeKind::OutThenRelease, 0.2, 0.0, ms(300), 25, ms(1000));
        assert!(!fade.is_due(ms(1011)));
        assert!(fade.is_due(ms(1012)));
        assert_eq!(fade.state(), FadeState::FadingOut);
        assert_eq!(fade.remaining_steps(), 25);
    }

    #[test]
    fn zero_steps_behave_as_one() {
        let mut fade = Fade::new(FadeKind::In, 0.0, 1.0, ms(0), 0, ms(0));
        assert!(fade.is_due(ms(0)));
        assert_eq!(fade.step(), 1.0);
        assert!(fade.is_complete());
        assert!(!fade.is_due(ms(10)));
    }
}
