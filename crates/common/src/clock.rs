//! Fixed-rate tick clock and time conversions.
//!
//! The recognizer runs in lock-step with a fixed simulation rate. Every
//! timestamp in Handsign is monotonic nanoseconds since the session epoch;
//! this module turns tick indices into those timestamps and converts
//! between seconds and nanoseconds.

/// Monotonic timestamp in nanoseconds since session start.
pub type TimestampNs = u64;

/// Convert an elapsed nanosecond value to seconds.
pub fn ns_to_secs(ns: TimestampNs) -> f64 {
    ns as f64 / 1_000_000_000.0
}

/// Convert seconds to nanoseconds. Negative input saturates to zero.
pub fn secs_to_ns(secs: f64) -> TimestampNs {
    (secs.max(0.0) * 1_000_000_000.0).round() as TimestampNs
}

/// A clock that advances in fixed simulation steps.
#[derive(Debug, Clone)]
pub struct TickClock {
    interval_ns: u64,
    tick: u64,

    /// Wall-clock time at tick zero (RFC 3339).
    epoch_wall: String,
}

impl TickClock {
    /// Create a clock stepping at `rate_hz`, anchored to the current wall time.
    pub fn new(rate_hz: u32) -> Self {
        Self::with_epoch(rate_hz, chrono::Utc::now().to_rfc3339())
    }

    /// Create a clock with a known wall-clock epoch (for replaying sessions).
    ///
    /// Rates above one tick per nanosecond are clamped to a 1 ns interval.
    pub fn with_epoch(rate_hz: u32, epoch_wall: String) -> Self {
        Self {
            interval_ns: (1_000_000_000 / rate_hz.max(1) as u64).max(1),
            tick: 0,
            epoch_wall,
        }
    }

    /// Timestamp of the current tick.
    pub fn now_ns(&self) -> TimestampNs {
        self.tick * self.interval_ns
    }

    /// Step one tick forward and return the new timestamp.
    pub fn advance(&mut self) -> TimestampNs {
        self.tick += 1;
        self.now_ns()
    }

    /// Number of ticks elapsed since the epoch.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Length of one tick in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.interval_ns
    }

    /// Wall-clock time at tick zero.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// How many whole ticks fit in `secs`.
    pub fn ticks_in(&self, secs: f64) -> u64 {
        secs_to_ns(secs) / self.interval_ns
    }
}
