//! Rotation deadline arithmetic.
//!
//! Computes when the currently open output file must be rotated:
//! - the first deadline after sink construction, snapped to a clock boundary
//!   (or to the configured time of day for daily rotation)
//! - each following deadline, advanced from the previous one so the cadence
//!   is preserved even when writes are bursty or delayed
//!
//! Every function takes the relevant instant as an explicit parameter and
//! never samples the system clock, so deadline sequences are deterministic
//! and unit-testable without real-time waiting.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, TimeZone, Timelike, Utc};
use thiserror::Error;

/// Seconds in one minute.
pub const SECS_PER_MINUTE: u64 = 60;

/// Seconds in one hour.
pub const SECS_PER_HOUR: u64 = 3600;

/// Seconds in one day.
pub const SECS_PER_DAY: u64 = 86400;

/// When the output file rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    /// Rotate every `interval` minutes, aligned to minute boundaries.
    Minutely,
    /// Rotate every `interval` hours, aligned to hour boundaries.
    Hourly,
    /// Rotate once a day at a configured time of day.
    Daily,
}

/// Error parsing a rotation mode string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown rotation mode {0:?}, expected \"M\", \"H\" or \"daily\"")]
pub struct ModeParseError(String);

impl FromStr for RotationMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(RotationMode::Minutely),
            "H" => Ok(RotationMode::Hourly),
            "daily" => Ok(RotationMode::Daily),
            other => Err(ModeParseError(other.to_string())),
        }
    }
}

impl fmt::Display for RotationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationMode::Minutely => f.write_str("M"),
            RotationMode::Hourly => f.write_str("H"),
            RotationMode::Daily => f.write_str("daily"),
        }
    }
}

/// Which timezone calendar arithmetic and date-stamped names use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timezone {
    /// Platform local time.
    #[default]
    Local,
    /// Calendar time with zero UTC offset.
    Utc,
}

/// Compute the first rotation deadline strictly after `now`.
///
/// Minutely rotation snaps to the next minute boundary (seconds zeroed) and
/// hourly rotation to the next hour boundary (minutes and seconds zeroed),
/// so rotations align to clock boundaries rather than to process-start
/// offsets. Daily rotation picks the next occurrence of
/// `daily_hour:daily_minute` in the given timezone, rolling to tomorrow if
/// today's occurrence has already passed.
pub fn first_deadline(
    now: u64,
    mode: RotationMode,
    timezone: Timezone,
    daily_hour: u32,
    daily_minute: u32,
) -> u64 {
    let computed = match timezone {
        Timezone::Utc => first_deadline_in(&Utc, now, mode, daily_hour, daily_minute),
        Timezone::Local => first_deadline_in(&Local, now, mode, daily_hour, daily_minute),
    };

    // Out-of-range daily times are rejected by config validation; if the
    // calendar math still comes up empty, fall back to one full period.
    computed
        .filter(|&deadline| deadline > now)
        .unwrap_or_else(|| now + period_secs(mode, 1))
}

/// Compute the deadline that follows `prev`.
///
/// Advancing from the previous deadline rather than from the triggering
/// write keeps the sequence periodic: `interval` minutes or hours, exactly
/// 24h for daily. The result is always strictly greater than `prev`
/// (a zero interval is treated as 1).
pub fn next_deadline(prev: u64, mode: RotationMode, interval: u32) -> u64 {
    prev + period_secs(mode, interval)
}

fn period_secs(mode: RotationMode, interval: u32) -> u64 {
    let interval = u64::from(interval.max(1));
    match mode {
        RotationMode::Minutely => interval * SECS_PER_MINUTE,
        RotationMode::Hourly => interval * SECS_PER_HOUR,
        RotationMode::Daily => SECS_PER_DAY,
    }
}

fn first_deadline_in<Tz: TimeZone>(
    tz: &Tz,
    now: u64,
    mode: RotationMode,
    daily_hour: u32,
    daily_minute: u32,
) -> Option<u64> {
    match mode {
        RotationMode::Minutely => {
            let dt = tz.timestamp_opt(now as i64, 0).single()?;
            let snapped = dt.with_second(0)? + Duration::minutes(1);
            Some(snapped.timestamp() as u64)
        }
        RotationMode::Hourly => {
            let dt = tz.timestamp_opt(now as i64, 0).single()?;
            let snapped = dt.with_minute(0)?.with_second(0)? + Duration::hours(1);
            Some(snapped.timestamp() as u64)
        }
        RotationMode::Daily => {
            let today = tz.timestamp_opt(now as i64, 0).single()?.date_naive();
            let candidate = at_wall_clock(tz, today, daily_hour, daily_minute)?;
            if candidate.timestamp() as u64 > now {
                return Some(candidate.timestamp() as u64);
            }
            let tomorrow = today.succ_opt()?;
            let rolled = at_wall_clock(tz, tomorrow, daily_hour, daily_minute)?;
            Some(rolled.timestamp() as u64)
        }
    }
}

/// Resolve `date` at `hour:minute:00` in `tz` to an absolute instant.
fn at_wall_clock<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Tz>> {
    let naive = date.and_hms_opt(hour, minute, 0)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        // A DST fall-back repeats the wall-clock time; take the earlier pass.
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        // A DST spring-forward skipped the wall-clock time; take the first
        // valid instant after it.
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    }
}
