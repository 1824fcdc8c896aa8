//! Injectable wall-clock abstraction.
//!
//! Cache TTL checks, provenance timestamps, and checkpoint restoration all
//! read time through [`Clock`] so they are deterministic under test.
//! Production code uses [`SystemClock`]; tests use [`ManualClock`] and
//! advance it explicitly.
//!
//! Monotonic elapsed-time measurement (`elapsed_ms` in responses) and async
//! deadlines deliberately do not go through this trait; they use
//! `std::time::Instant` and `tokio::time` respectively.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Source of wall-clock timestamps.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

impl fmt::Debug for dyn Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Clock")
    }
}

/// Production clock reading `Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test-controlled clock.
///
/// Starts at a caller-supplied instant and only moves when told to.
/// Shared via `Arc` so the component under test and the test body observe
/// the same timeline.
///
/// # Example
///
/// ```
/// use babel_search_core::clock::{Clock, ManualClock};
/// use chrono::Duration;
///
/// let clock = ManualClock::starting_now();
/// let before = clock.now();
/// clock.advance(Duration::seconds(90));
/// assert_eq!(clock.now() - before, Duration::seconds(90));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Create a clock frozen at the current system time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Create an `Arc`-wrapped clock frozen at the current system time.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::starting_now())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Pin the clock to an exact instant.
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
