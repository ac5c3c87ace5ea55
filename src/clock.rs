//! Frame clock
//!
//! Tracks elapsed time between ticks on top of a host supplied monotonic time
//! source (`performance.now()` on the web, `Instant` on desktop).

/// Monotonic time in seconds since an arbitrary origin
pub trait TimeSource {
    fn now(&self) -> f64;
}

/// Elapsed-time tracker queried once per tick
#[derive(Debug)]
pub struct Clock<T: TimeSource> {
    source: T,
    start: f64,
    last: f64,
}

impl<T: TimeSource> Clock<T> {
    pub fn new(source: T) -> Self {
        let now = source.now();
        Self {
            source,
            start: now,
            last: now,
        }
    }

    /// Restart measurement; the next delta is measured from here
    pub fn start(&mut self) {
        let now = self.source.now();
        self.start = now;
        self.last = now;
    }

    /// Seconds since the previous call (or since `start`). Never negative, and
    /// not clamped from above: a stalled tab reports the whole stall.
    pub fn delta(&mut self) -> f32 {
        let now = self.source.now();
        let delta = (now - self.last).max(0.0);
        // only move forward so a backwards step is absorbed instead of repaid
        self.last = self.last.max(now);
        delta as f32
    }

    /// Seconds since `start`
    pub fn elapsed(&self) -> f64 {
        (self.last - self.start).max(0.0)
    }

    pub fn source(&self) -> &T {
        &self.source
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod instant {
    use super::TimeSource;
    use std::time::Instant;

    /// Desktop time source anchored at construction
    #[derive(Debug, Clone, Copy)]
    pub struct InstantTime {
        origin: Instant,
    }

    impl Default for InstantTime {
        fn default() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl TimeSource for InstantTime {
        fn now(&self) -> f64 {
            self.origin.elapsed().as_secs_f64()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use instant::InstantTime;
