// SPDX-License-Identifier: GPL-3.0-only

//! Injectable time source
//!
//! The session never reads wall-clock time directly; it asks its clock.
//! Timers are plain deadlines checked against `now()` once per callback
//! turn, which keeps tap/hold disambiguation and the recording cap fully
//! deterministic under the manual clock used in tests.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic time
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// Real monotonic clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock
///
/// Clones share the same timeline, so a test can hold one handle while the
/// session owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap();
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}
