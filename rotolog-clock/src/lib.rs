//! Clock abstraction and rotation deadline arithmetic for rotolog.
//!
//! This crate provides:
//! - A `Clock` trait for sampling the current time, with real and mock
//!   implementations to enable deterministic testing
//! - Pure deadline arithmetic for minutely, hourly and daily rotation

pub mod deadline;

pub use deadline::{
    first_deadline, next_deadline, ModeParseError, RotationMode, Timezone, SECS_PER_DAY,
    SECS_PER_HOUR, SECS_PER_MINUTE,
};

use std::time::UNIX_EPOCH;

/// Trait for sampling the current Unix timestamp.
///
/// The rotating sink samples a clock exactly once, at construction, to
/// anchor the first rotation deadline. Every later decision takes the
/// record timestamp as an explicit argument, so all deadline arithmetic
/// stays testable without real-time waiting.
pub trait Clock: Send + Sync {
    /// Returns the current time as Unix seconds since epoch.
    fn now_unix_sec(&self) -> u64;
}

/// Wall clock backed by the operating system; what production sinks use.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_sec(&self) -> u64 {
        UNIX_EPOCH
            .elapsed()
            .expect("system time before Unix epoch")
            .as_secs()
    }
}

/// Clock pinned at a fixed instant, so a sink under test anchors its
/// first deadline at a known point without waiting on real time.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    timestamp: u64,
}

impl MockClock {
    /// Pin the clock at `timestamp` Unix seconds.
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

impl Clock for MockClock {
    fn now_unix_sec(&self) -> u64 {
        self.timestamp
    }
}
