//! Deterministic naming for rotated files.
//!
//! Produces the on-disk names external tooling globs for:
//! - date form: `<stem>_<YYYY>-<MM>-<DD><ext>`
//! - date-and-time form: `<stem>_<YYYY>-<MM>-<DD>_<HH>-<MM>-<SS><ext>`
//! - index form: `<stem>.<N><ext>` with N >= 1; index 0 is the unsuffixed
//!   working file and returns the path unchanged
//!
//! All functions are pure; timestamps are explicit parameters.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use rotolog_clock::Timezone;

/// Split a path into its stem (directory preserved) and dotted extension.
///
/// The extension is the final dotted suffix of the filename component, the
/// platform-standard definition: `logs/app.log` splits into `logs/app` and
/// `.log`; a file without a dot has an empty extension.
pub fn split_stem_extension(path: &Path) -> (PathBuf, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let stem_path = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(&stem),
        _ => PathBuf::from(&stem),
    };

    (stem_path, extension)
}

/// Append a zero-padded date (and optionally time) suffix to `path`.
///
/// `zero_minutes` and `zero_seconds` truncate the stamped time to the
/// containing hour or minute, so hourly rotations of the same bucket share
/// one name regardless of when inside the bucket the file was created.
pub fn append_date_suffix(
    path: &Path,
    ts: u64,
    include_time: bool,
    timezone: Timezone,
    zero_minutes: bool,
    zero_seconds: bool,
) -> PathBuf {
    let (year, month, day, hour, mut minute, mut second) = broken_down(ts, timezone);
    if zero_minutes {
        minute = 0;
    }
    if zero_seconds {
        second = 0;
    }

    let (stem, extension) = split_stem_extension(path);
    let name = if include_time {
        format!(
            "{}_{:04}-{:02}-{:02}_{:02}-{:02}-{:02}{}",
            stem.display(),
            year,
            month,
            day,
            hour,
            minute,
            second,
            extension
        )
    } else {
        format!(
            "{}_{:04}-{:02}-{:02}{}",
            stem.display(),
            year,
            month,
            day,
            extension
        )
    };

    PathBuf::from(name)
}

/// Append a numeric suffix to `path`. Index 0 means "no suffix".
pub fn append_index_suffix(path: &Path, index: u32) -> PathBuf {
    if index == 0 {
        return path.to_path_buf();
    }

    let (stem, extension) = split_stem_extension(path);
    PathBuf::from(format!("{}.{}{}", stem.display(), index, extension))
}

fn broken_down(ts: u64, timezone: Timezone) -> (i32, u32, u32, u32, u32, u32) {
    match timezone {
        Timezone::Utc => fields(Utc.timestamp_opt(ts as i64, 0).single()),
        Timezone::Local => fields(Local.timestamp_opt(ts as i64, 0).single()),
    }
}

fn fields<Tz: TimeZone>(dt: Option<DateTime<Tz>>) -> (i32, u32, u32, u32, u32, u32) {
    dt.map(|dt| {
        (
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second(),
        )
    })
    .unwrap_or((1970, 1, 1, 0, 0, 0))
}
