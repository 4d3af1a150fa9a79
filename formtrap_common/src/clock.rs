//! Wall-clock time sources
//!
//! The classifier compares whole Unix seconds, so every clock reports
//! truncated seconds rather than an `Instant`.

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current Unix time in whole seconds
pub trait Clock: Send + Sync {
    fn now_unix_secs(&self) -> i64;
}

/// Reads the system clock on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> i64 {
        // timestamp() drops the sub-second part
        Utc::now().timestamp()
    }
}

/// Clock pinned to a settable instant (tests, replays)
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_unix_secs(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
