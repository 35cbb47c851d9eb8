//! Sink configuration and validation.

use std::path::PathBuf;

use rotolog_clock::{RotationMode, Timezone};
use rotolog_fs::OpenMode;
use thiserror::Error;

/// Default interval for minutely/hourly rotation.
pub const DEFAULT_INTERVAL: u32 = 1;

/// Default size cap in bytes; 0 disables size-based rotation.
pub const DEFAULT_MAX_BYTES: u64 = 0;

/// Default number of rotated files to keep; 0 keeps all of them.
pub const DEFAULT_BACKUP_COUNT: usize = 0;

/// Default daily rotation time of day (midnight).
pub const DEFAULT_DAILY_HOUR: u32 = 0;
pub const DEFAULT_DAILY_MINUTE: u32 = 0;

/// Errors from configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("base path must not be empty")]
    EmptyBasePath,

    #[error("interval must be at least 1, got {0}")]
    InvalidInterval(u32),

    #[error("daily rotation hour must be 0-23, got {0}")]
    InvalidDailyHour(u32),

    #[error("daily rotation minute must be 0-59, got {0}")]
    InvalidDailyMinute(u32),
}

/// Whether the initial working file name already carries a date stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilenameAppend {
    /// Plain base name.
    #[default]
    None,
    /// `<stem>_<YYYY>-<MM>-<DD><ext>`.
    Date,
    /// `<stem>_<YYYY>-<MM>-<DD>_<HH>-<MM>-<SS><ext>`.
    DateAndTime,
}

/// Immutable rotation policy, supplied at sink construction.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Base file path; the unsuffixed working name of the live file.
    pub base_path: PathBuf,

    /// When the file rotates on time.
    pub mode: RotationMode,

    /// Rotation interval; meaningful for minutely/hourly modes only.
    pub interval: u32,

    /// Size cap in bytes; 0 disables size-based rotation.
    pub max_bytes: u64,

    /// Rotated files to keep; oldest evicted first when exceeded. 0 keeps all.
    pub backup_count: usize,

    /// Timezone for deadline arithmetic and date-stamped names.
    pub timezone: Timezone,

    /// Daily rotation time of day; meaningful for daily mode only.
    pub daily_hour: u32,
    pub daily_minute: u32,

    /// Date-stamping policy for the initial working file name.
    pub filename_append: FilenameAppend,

    /// How the initial file is opened (append recovers the existing size).
    pub open_mode: OpenMode,

    /// Whether `flush` also invokes the OS durability primitive.
    pub fsync_on_flush: bool,
}

impl SinkConfig {
    /// Create a config with defaults for everything but the required fields.
    pub fn new(base_path: impl Into<PathBuf>, mode: RotationMode) -> Self {
        Self {
            base_path: base_path.into(),
            mode,
            interval: DEFAULT_INTERVAL,
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
            timezone: Timezone::default(),
            daily_hour: DEFAULT_DAILY_HOUR,
            daily_minute: DEFAULT_DAILY_MINUTE,
            filename_append: FilenameAppend::default(),
            open_mode: OpenMode::default(),
            fsync_on_flush: false,
        }
    }

    /// Builder: set the minutely/hourly interval.
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Builder: set the size cap in bytes.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Builder: set the retention window.
    pub fn with_backup_count(mut self, backup_count: usize) -> Self {
        self.backup_count = backup_count;
        self
    }

    /// Builder: set the timezone.
    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Builder: set the daily rotation time of day.
    pub fn with_daily_time(mut self, hour: u32, minute: u32) -> Self {
        self.daily_hour = hour;
        self.daily_minute = minute;
        self
    }

    /// Builder: set the initial filename date-stamping policy.
    pub fn with_filename_append(mut self, filename_append: FilenameAppend) -> Self {
        self.filename_append = filename_append;
        self
    }

    /// Builder: set how the initial file is opened.
    pub fn with_open_mode(mut self, open_mode: OpenMode) -> Self {
        self.open_mode = open_mode;
        self
    }

    /// Builder: set the fsync-on-flush policy.
    pub fn with_fsync_on_flush(mut self, fsync_on_flush: bool) -> Self {
        self.fsync_on_flush = fsync_on_flush;
        self
    }

    /// Validate field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBasePath);
        }
        if self.interval == 0 {
            return Err(ConfigError::InvalidInterval(self.interval));
        }
        if self.daily_hour > 23 {
            return Err(ConfigError::InvalidDailyHour(self.daily_hour));
        }
        if self.daily_minute > 59 {
            return Err(ConfigError::InvalidDailyMinute(self.daily_minute));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SinkConfig::new("app.log", RotationMode::Daily);
        assert_eq!(config.interval, 1);
        assert_eq!(config.max_bytes, 0);
        assert_eq!(config.backup_count, 0);
        assert_eq!(config.timezone, Timezone::Local);
        assert_eq!(config.daily_hour, 0);
        assert_eq!(config.daily_minute, 0);
        assert_eq!(config.filename_append, FilenameAppend::None);
        assert_eq!(config.open_mode, OpenMode::Truncate);
        assert!(!config.fsync_on_flush);
    }

    #[test]
    fn test_builders_chain() {
        let config = SinkConfig::new("app.log", RotationMode::Hourly)
            .with_interval(6)
            .with_max_bytes(1024)
            .with_backup_count(3)
            .with_timezone(Timezone::Utc)
            .with_daily_time(23, 45)
            .with_filename_append(FilenameAppend::Date)
            .with_open_mode(OpenMode::Append)
            .with_fsync_on_flush(true);

        assert_eq!(config.interval, 6);
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.backup_count, 3);
        assert_eq!(config.timezone, Timezone::Utc);
        assert_eq!((config.daily_hour, config.daily_minute), (23, 45));
        assert_eq!(config.filename_append, FilenameAppend::Date);
        assert_eq!(config.open_mode, OpenMode::Append);
        assert!(config.fsync_on_flush);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let config = SinkConfig::new("app.log", RotationMode::Minutely);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_empty_base_path() {
        let config = SinkConfig::new("", RotationMode::Daily);
        assert_eq!(config.validate(), Err(ConfigError::EmptyBasePath));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = SinkConfig::new("app.log", RotationMode::Minutely).with_interval(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidInterval(0)));
    }

    #[test]
    fn test_validate_rejects_out_of_range_daily_time() {
        let config = SinkConfig::new("app.log", RotationMode::Daily).with_daily_time(24, 0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidDailyHour(24)));

        let config = SinkConfig::new("app.log", RotationMode::Daily).with_daily_time(0, 60);
        assert_eq!(config.validate(), Err(ConfigError::InvalidDailyMinute(60)));
    }

    #[test]
    fn test_validate_boundary_daily_time() {
        let config = SinkConfig::new("app.log", RotationMode::Daily).with_daily_time(23, 59);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_mode_string_from_host_config() {
        // The host hands in "M", "H" or "daily"
        let mode: RotationMode = "daily".parse().expect("parse");
        let config = SinkConfig::new("app.log", mode);
        assert_eq!(config.mode, RotationMode::Daily);
    }
}
