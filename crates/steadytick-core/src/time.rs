use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Wall-clock source and idle sleeper used by the loop.
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> f64;

    /// Blocks for roughly `ms` milliseconds.
    fn sleep_ms(&self, ms: f64);
}

/// Real time, measured from construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn sleep_ms(&self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            thread::sleep(Duration::from_secs_f64(ms / 1000.0));
        }
    }
}

/// Hand-driven clock. Time only moves through `advance`/`set` or a loop sleep.
///
/// Clones share the same time, so a test (or an entity) can keep a handle
/// while the scheduler owns another.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
    slept: Arc<Mutex<Vec<f64>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: f64) {
        *self.now.lock() += ms;
    }

    pub fn set(&self, ms: f64) {
        *self.now.lock() = ms;
    }

    /// Every sleep the loop asked for, in order.
    pub fn sleeps(&self) -> Vec<f64> {
        self.slept.lock().clone()
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now_ms(&self) -> f64 {
        *self.now.lock()
    }

    fn sleep_ms(&self, ms: f64) {
        self.slept.lock().push(ms);
        if ms.is_finite() && ms > 0.0 {
            self.advance(ms);
        }
    }
}
