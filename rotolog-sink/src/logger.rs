//! Diagnostic logging for best-effort failures.
//!
//! Rename and remove failures during rotation or eviction do not abort the
//! write that triggered them; they are reported through this trait and
//! swallowed. Trait-based so tests can assert on exactly what was reported
//! without global state.

use std::io::Write;
use std::sync::{Arc, RwLock};

/// Verbosity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Always shown; used for cleanup failures the operator should see.
    Normal,
    /// Rotation traffic (which file went where).
    Verbose,
    /// Per-decision detail.
    Debug,
}

/// Trait for diagnostic output.
pub trait Logger: Send + Sync {
    /// Report a message at the given verbosity level.
    fn log(&self, level: Verbosity, message: &str);

    /// Report at normal level (always visible).
    fn info(&self, message: &str) {
        self.log(Verbosity::Normal, message);
    }

    /// Report at verbose level.
    fn verbose(&self, message: &str) {
        self.log(Verbosity::Verbose, message);
    }

    /// Report at debug level.
    fn debug(&self, message: &str) {
        self.log(Verbosity::Debug, message);
    }
}

/// Logger that writes to stderr.
#[derive(Debug)]
pub struct StderrLogger {
    level: Verbosity,
}

impl StderrLogger {
    /// Create a stderr logger showing messages up to `level`.
    pub fn new(level: Verbosity) -> Self {
        Self { level }
    }
}

impl Default for StderrLogger {
    fn default() -> Self {
        Self::new(Verbosity::Normal)
    }
}

impl Logger for StderrLogger {
    fn log(&self, level: Verbosity, message: &str) {
        if level <= self.level {
            let _ = writeln!(std::io::stderr(), "{}", message);
        }
    }
}

/// A captured diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Verbosity,
    pub message: String,
}

/// Mock logger for testing that captures all messages.
#[derive(Debug, Clone, Default)]
pub struct MockLogger {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl MockLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().unwrap().clone()
    }

    /// Get all captured messages (just the text).
    pub fn messages(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(|entry| entry.message.clone())
            .collect()
    }

    /// Check if any message contains the given substring.
    pub fn contains(&self, substring: &str) -> bool {
        self.messages()
            .iter()
            .any(|message| message.contains(substring))
    }

    /// Count of captured messages.
    pub fn count(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

impl Logger for MockLogger {
    fn log(&self, level: Verbosity, message: &str) {
        // Capture everything regardless of level so tests can inspect
        // what would have been reported
        self.entries.write().unwrap().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}

/// A no-op logger that discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Verbosity, _message: &str) {}
}
