use std::time::{Duration, Instant};

/// Minimum-interval gate between render passes.
///
/// A result is admitted only when strictly more than `interval` has passed
/// since the last admitted one. Rejected results do not move the window.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Whether a result completing at `now` may be rendered
    pub fn admit(&mut self, now: Instant) -> bool {
        let admitted = match self.last {
            Some(last) => now.saturating_duration_since(last) > self.interval,
            None => true,
        };
        if admitted {
            self.last = Some(now);
        }
        admitted
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
