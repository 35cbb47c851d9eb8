//! Rotating output-file sink.
//!
//! A [`RotatingSink`] writes serialized records to a single live file and
//! rotates it on time boundaries, on a size cap, or both. Rotated files get
//! deterministic names derived from the base path (a date stamp for time
//! rotations, a numeric index for size rotations) and a bounded FIFO window
//! of backups is kept on disk.
//!
//! The sink is generic over the [`Filesystem`](rotolog_fs::Filesystem) and
//! [`Logger`] seams so rotation behavior is testable without touching disk.
//! Deadline arithmetic lives in [`rotolog_clock`].

pub mod config;
pub mod logger;
pub mod sink;

pub use config::{
    ConfigError, FilenameAppend, SinkConfig, DEFAULT_BACKUP_COUNT, DEFAULT_DAILY_HOUR,
    DEFAULT_DAILY_MINUTE, DEFAULT_INTERVAL, DEFAULT_MAX_BYTES,
};
pub use logger::{LogEntry, Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use sink::{RetainedFile, RotatingSink, SinkError};
