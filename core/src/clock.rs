//! Wall clock — the only source of "now" the engine ever sees.
//!
//! RULE: Nothing in the engine reads the system time directly.
//! The scheduler asks its injected clock; transitions take `now` as input.

use crate::types::TimestampMs;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

pub trait WallClock: Send {
    /// Current time in epoch milliseconds.
    fn now(&self) -> TimestampMs;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> TimestampMs {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time,
/// so a test keeps one handle and gives another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn at(now: TimestampMs) -> Self {
        Self { now: Arc::new(AtomicI64::new(now)) }
    }

    pub fn set(&self, now: TimestampMs) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `ms` and return the new time.
    pub fn advance(&self, ms: i64) -> TimestampMs {
        self.now.fetch_add(ms, Ordering::SeqCst) + ms
    }
}

impl WallClock for ManualClock {
    fn now(&self) -> TimestampMs {
        self.now.load(Ordering::SeqCst)
    }
}
