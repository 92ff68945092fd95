//! Frame clock that converts timestamps into clamped tick deltas.

use std::time::Duration;

/// Turns monotonically increasing frame timestamps into tick deltas.
#[derive(Clone, Copy, Debug)]
pub struct TickClock {
    last: Option<Duration>,
    max_delta: Duration,
}

impl TickClock {
    /// Creates a clock whose deltas never exceed `max_delta`.
    #[must_use]
    pub const fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    /// Records a frame observed at `now` and returns the delta to simulate.
    ///
    /// The first frame only primes the clock. Frames that do not advance time
    /// yield `None` as well. Long pauses are clamped to the configured maximum
    /// so a suspended process does not replay a huge jump in one tick.
    pub fn frame(&mut self, now: Duration) -> Option<Duration> {
        let last = self.last.replace(now)?;
        let delta = now.saturating_sub(last);
        if delta.is_zero() {
            return None;
        }
        if delta > self.max_delta {
            log::trace!("clamping frame delta {delta:?} to {:?}", self.max_delta);
        }
        Some(delta.min(self.max_delta))
    }
}
