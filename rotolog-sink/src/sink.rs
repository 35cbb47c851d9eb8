//! The rotating sink: the stateful orchestrator of rotation decisions.
//!
//! Owns the current file handle, the running size counter, the rotation
//! deadlines and a bounded queue of previously rotated files. Each write
//! flows through here: if the time or size trigger fires, the live file is
//! closed, renamed to its deterministic rotated name, a fresh file is opened
//! at the working name, and the oldest backups are evicted.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rotolog_clock::{first_deadline, next_deadline, Clock, RotationMode};
use rotolog_fs::{naming, Filesystem, FsError, OpenMode};
use thiserror::Error;

use crate::config::{ConfigError, FilenameAppend, SinkConfig};
use crate::logger::Logger;

/// Errors surfaced to the sink's caller.
///
/// Open and write failures are fatal to the write that hit them; rename and
/// remove failures during rotation or eviction never appear here, they are
/// reported to the diagnostic logger and swallowed.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// A rotated file the sink created and is responsible for deleting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedFile {
    /// Numeric rotation index inside its time bucket; 0 for date-named files.
    pub index: u32,
    pub path: PathBuf,
}

/// Rotating output-file sink.
///
/// Single-writer: all calls must arrive serialized by the caller. There is
/// no internal locking, rotation runs synchronously inside the write path,
/// and file operations may block on the underlying storage device.
#[derive(Debug)]
pub struct RotatingSink<F: Filesystem, L: Logger> {
    fs: F,
    logger: L,
    config: SinkConfig,
    /// The live file's on-disk name (base path, optionally date-stamped).
    working_path: PathBuf,
    /// At most one live handle; `None` only after a failed reopen.
    handle: Option<F::Handle>,
    /// Bytes written to the live file since it was opened.
    current_size: u64,
    file_creation_ts: u64,
    next_rotation_ts: u64,
    /// Highest size-rotation index used in the current time bucket.
    rotation_index: u32,
    /// Rotated files, oldest first.
    retained: VecDeque<RetainedFile>,
}

impl<F: Filesystem, L: Logger> RotatingSink<F, L> {
    /// Open the initial file and anchor the first rotation deadline.
    ///
    /// The clock is sampled exactly once, here; every later decision takes
    /// the record timestamp passed to [`write`](Self::write).
    pub fn new<C: Clock>(
        fs: F,
        logger: L,
        config: SinkConfig,
        clock: &C,
    ) -> Result<Self, SinkError> {
        config.validate()?;
        let now = clock.now_unix_sec();

        let working_path = match config.filename_append {
            FilenameAppend::None => config.base_path.clone(),
            FilenameAppend::Date => naming::append_date_suffix(
                &config.base_path,
                now,
                false,
                config.timezone,
                false,
                false,
            ),
            FilenameAppend::DateAndTime => naming::append_date_suffix(
                &config.base_path,
                now,
                true,
                config.timezone,
                false,
                false,
            ),
        };

        let handle = fs.create(&working_path, config.open_mode)?;

        let current_size = match config.open_mode {
            OpenMode::Truncate => 0,
            OpenMode::Append => match fs.size_of(&working_path) {
                Ok(size) => size,
                // The size matters only when the size trigger is armed;
                // otherwise degrade by skipping the size check.
                Err(err) if config.max_bytes > 0 => return Err(err.into()),
                Err(_) => 0,
            },
        };

        let next_rotation_ts = first_deadline(
            now,
            config.mode,
            config.timezone,
            config.daily_hour,
            config.daily_minute,
        );

        Ok(Self {
            fs,
            logger,
            config,
            working_path,
            handle: Some(handle),
            current_size,
            file_creation_ts: now,
            next_rotation_ts,
            rotation_index: 0,
            retained: VecDeque::new(),
        })
    }

    /// Write one serialized record at `ts`, rotating first if a trigger fires.
    ///
    /// Open and write failures are fatal and the record is lost unless the
    /// caller retries at a higher layer.
    pub fn write(&mut self, bytes: &[u8], ts: u64) -> Result<(), SinkError> {
        let rotated_for_time = self.check_time_rotation(ts)?;

        // Checking size only when the time trigger did not fire keeps
        // rotations to one per write; changing this ordering changes
        // observable rotation counts.
        if !rotated_for_time && self.config.max_bytes > 0 {
            self.check_size_rotation(bytes.len() as u64, ts)?;
        }

        if self.handle.is_none() {
            // A failed reopen during an earlier rotation left no live file;
            // retry before giving up on the record. Appending preserves any
            // bytes an earlier partial failure left at the working name, so
            // the size is recovered from disk like an append-mode open at
            // construction.
            let handle = self.fs.create(&self.working_path, OpenMode::Append)?;
            let size = match self.fs.size_of(&self.working_path) {
                Ok(size) => size,
                Err(err) if self.config.max_bytes > 0 => return Err(err.into()),
                Err(_) => 0,
            };
            self.handle = Some(handle);
            self.current_size = size;
            self.file_creation_ts = ts;
        }
        if let Some(handle) = self.handle.as_mut() {
            self.fs.write_all(handle, bytes)?;
        }
        self.current_size += bytes.len() as u64;
        Ok(())
    }

    /// Flush buffered data; fsync only when configured.
    pub fn flush(&mut self) -> Result<(), SinkError> {
        if let Some(handle) = self.handle.as_mut() {
            self.fs.flush(handle, self.config.fsync_on_flush)?;
        }
        Ok(())
    }

    /// The live file's on-disk name.
    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    /// Bytes written to the live file since it was opened.
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// The next rotation deadline as Unix seconds.
    pub fn next_rotation_ts(&self) -> u64 {
        self.next_rotation_ts
    }

    /// Creation time of the live file as Unix seconds.
    pub fn file_creation_ts(&self) -> u64 {
        self.file_creation_ts
    }

    /// Rotated files currently tracked for retention, oldest first.
    pub fn retained_files(&self) -> &VecDeque<RetainedFile> {
        &self.retained
    }

    fn check_time_rotation(&mut self, ts: u64) -> Result<bool, SinkError> {
        if ts < self.next_rotation_ts {
            return Ok(false);
        }

        // The closed file is named after its own creation time. Daily files
        // carry the date alone; minutely and hourly files need the time as
        // well, truncated to their bucket.
        let include_time = !matches!(self.config.mode, RotationMode::Daily);
        let zero_minutes = matches!(self.config.mode, RotationMode::Hourly);
        let target = naming::append_date_suffix(
            &self.working_path,
            self.file_creation_ts,
            include_time,
            self.config.timezone,
            zero_minutes,
            true,
        );

        self.rotate_to(target, 0, ts)?;
        // A fresh time bucket: numeric indices restart
        self.rotation_index = 0;
        // Advance from the old deadline, not from ts, so the cadence is
        // preserved even when writes are bursty or delayed
        self.next_rotation_ts =
            next_deadline(self.next_rotation_ts, self.config.mode, self.config.interval);
        Ok(true)
    }

    fn check_size_rotation(&mut self, incoming: u64, ts: u64) -> Result<(), SinkError> {
        if self.current_size + incoming <= self.config.max_bytes {
            return Ok(());
        }

        let index = self.rotation_index + 1;
        let target = naming::append_index_suffix(&self.working_path, index);
        self.rotate_to(target, index, ts)?;
        Ok(())
    }

    /// Close the live file, move it to `target`, reopen the working name.
    ///
    /// The rename is best-effort: on failure the sink reports a diagnostic
    /// and keeps going, preferring availability of logging over strict
    /// retention. Reopening the working name is fatal on failure.
    fn rotate_to(&mut self, target: PathBuf, index: u32, ts: u64) -> Result<(), SinkError> {
        if let Some(mut handle) = self.handle.take() {
            self.fs.flush(&mut handle, self.config.fsync_on_flush)?;
        }

        match self.fs.rename(&self.working_path, &target) {
            Ok(()) => {
                self.logger.verbose(&format!(
                    "rotated {} -> {}",
                    self.working_path.display(),
                    target.display()
                ));
                self.retained.push_back(RetainedFile { index, path: target });
                // The index is consumed the moment the rename lands; a later
                // failure in this rotation must not let it be reused, or the
                // next rotation would rename over this backup and eviction
                // would pop a stale queue entry pointing at it
                self.rotation_index = index;
                self.evict_backups();
            }
            Err(err) => {
                // Not retained: the sink only deletes files it actually moved
                self.logger.info(&format!("rotation rename failed: {err}"));
            }
        }

        let handle = self.fs.create(&self.working_path, OpenMode::Truncate)?;
        self.handle = Some(handle);
        self.current_size = 0;
        self.file_creation_ts = ts;
        Ok(())
    }

    /// Drop the oldest rotated files until the retention window fits.
    ///
    /// Never touches the live file. Failures are reported and swallowed;
    /// the backlog may stay larger than intended but the write proceeds.
    fn evict_backups(&mut self) {
        if self.config.backup_count == 0 {
            return;
        }
        while self.retained.len() > self.config.backup_count {
            if let Some(oldest) = self.retained.pop_front() {
                if let Err(err) = self.fs.remove(&oldest.path) {
                    self.logger
                        .info(&format!("failed to evict {}: {err}", oldest.path.display()));
                }
            }
        }
    }
}

impl<F: Filesystem, L: Logger> Drop for RotatingSink<F, L> {
    fn drop(&mut self) {
        // Best-effort teardown; buffered bytes land, errors have nowhere
        // to go
        if let Some(mut handle) = self.handle.take() {
            let _ = self.fs.flush(&mut handle, self.config.fsync_on_flush);
        }
    }
}
