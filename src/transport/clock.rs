//! Time sources for the transport

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Monotonic wall clock in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Real time, measured from construction
#[derive(Debug, Clone, Copy)]
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
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Externally driven clock. Clones share the same time.
///
/// Used by tests and by hosts that own the frame timer (a browser's
/// `requestAnimationFrame` timestamp, for instance).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward; negative steps are ignored.
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
            *now += seconds;
        }
    }

    /// Jump to an absolute time; going backwards is ignored.
    pub fn set(&self, seconds: f64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        if seconds > *now {
            *now = seconds;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
