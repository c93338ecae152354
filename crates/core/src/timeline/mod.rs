use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::scene::LightningOverlay;

/// Host-side clock pairing a wall-clock epoch with monotonic elapsed time.
/// Simulations advance it manually; live hosts re-anchor it from the system
/// clock.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostClock {
    epoch_start: i64,
    elapsed: Duration,
}

impl HostClock {
    pub fn starting_at(epoch_secs: i64) -> Self {
        Self {
            epoch_start: epoch_secs,
            elapsed: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, delta: Duration) {
        self.elapsed += delta;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Current wall-clock time in epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        let secs = i64::try_from(self.elapsed.as_secs()).unwrap_or(i64::MAX);
        self.epoch_start.saturating_add(secs)
    }
}

/// Low-frequency cadence. Fires at most once per poll; missed periods are
/// skipped rather than replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalTimer {
    period: Duration,
    next_due: Option<Duration>,
}

impl IntervalTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    /// Returns `true` when a period has elapsed. The first poll only arms
    /// the timer.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.period);
                false
            }
            Some(due) if now >= due => {
                self.next_due = Some(now + self.period);
                true
            }
            Some(_) => false,
        }
    }
}

/// Schedules the thunderstorm flash overlay: random gaps between flashes,
/// each flash lit for a fixed time.
#[derive(Debug, Clone)]
pub struct FlashScheduler {
    overlay: LightningOverlay,
    rng: StdRng,
    next_flash_at: Duration,
    lit_until: Option<Duration>,
    flashes: u64,
}

impl FlashScheduler {
    /// Creates a reproducible scheduler; the first flash follows one gap
    /// after `now`.
    pub fn seeded(overlay: LightningOverlay, seed: u64, now: Duration) -> Self {
        let mut scheduler = Self {
            overlay,
            rng: StdRng::seed_from_u64(seed),
            next_flash_at: now,
            lit_until: None,
            flashes: 0,
        };
        scheduler.next_flash_at = now + scheduler.next_gap();
        scheduler
    }

    pub fn new(overlay: LightningOverlay, now: Duration) -> Self {
        Self::seeded(overlay, rand::random(), now)
    }

    /// Returns whether the flash overlay is lit at `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        if let Some(until) = self.lit_until {
            if now < until {
                return true;
            }
            self.lit_until = None;
        }

        if now < self.next_flash_at {
            return false;
        }

        let until = self.next_flash_at + Duration::from_millis(self.overlay.flash_ms);
        self.flashes += 1;
        self.next_flash_at = now + self.next_gap();
        if now < until {
            self.lit_until = Some(until);
            true
        } else {
            false
        }
    }

    /// Flashes fired so far.
    pub fn flashes(&self) -> u64 {
        self.flashes
    }

    fn next_gap(&mut self) -> Duration {
        let LightningOverlay {
            min_interval_ms,
            max_interval_ms,
            ..
        } = self.overlay;
        let millis = if max_interval_ms > min_interval_ms {
            self.rng.random_range(min_interval_ms..max_interval_ms)
        } else {
            min_interval_ms
        };
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_clock_tracks_wall_time() {
        let mut clock = HostClock::starting_at(1_700_000_000);
        clock.advance(Duration::from_millis(1500));
        clock.advance(Duration::from_millis(600));
        assert_eq!(clock.elapsed(), Duration::from_millis(2100));
        assert_eq!(clock.epoch_secs(), 1_700_000_002);
    }

    #[test]
    fn interval_timer_arms_then_fires_each_period() {
        let mut timer = IntervalTimer::new(Duration::from_secs(60));
        assert!(!timer.poll(Duration::from_secs(5)));
        assert!(!timer.poll(Duration::from_secs(64)));
        assert!(timer.poll(Duration::from_secs(65)));
        assert!(!timer.poll(Duration::from_secs(66)));
        // A long stall fires once, not once per missed period.
        assert!(timer.poll(Duration::from_secs(600)));
        assert!(!timer.poll(Duration::from_secs(601)));
    }

    #[test]
    fn flashes_respect_gap_bounds_and_duration() {
        let overlay = LightningOverlay::default();
        let mut scheduler = FlashScheduler::seeded(overlay, 7, Duration::ZERO);

        let mut lit_ms = 0u64;
        let mut onsets = Vec::new();
        let mut was_lit = false;
        for ms in (0..120_000u64).step_by(10) {
            let lit = scheduler.poll(Duration::from_millis(ms));
            if lit {
                lit_ms += 10;
                if !was_lit {
                    onsets.push(ms);
                }
            }
            was_lit = lit;
        }

        assert!(onsets.len() >= 120_000 / 9_000 - 1);
        assert!(onsets.len() <= 120_000 / 3_000 + 1);
        for pair in onsets.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((3_000..=9_010).contains(&gap), "gap {gap}");
        }
        assert_eq!(lit_ms, onsets.len() as u64 * 120);
        assert_eq!(scheduler.flashes(), onsets.len() as u64);
    }

    #[test]
    fn same_seed_same_storm() {
        let overlay = LightningOverlay::default();
        let mut a = FlashScheduler::seeded(overlay, 42, Duration::ZERO);
        let mut b = FlashScheduler::seeded(overlay, 42, Duration::ZERO);
        for ms in (0..30_000u64).step_by(10) {
            let now = Duration::from_millis(ms);
            assert_eq!(a.poll(now), b.poll(now));
        }
    }
}
