//! Filesystem adapter trait with real and mock implementations.
//!
//! Each operation fails with a typed outcome rather than crashing the
//! process. Open, write and stat failures are fatal to the caller's
//! operation; remove and rename are best-effort cleanup, so callers are
//! expected to log their errors and continue.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("failed to open {path:?} ({mode:?}): {source}")]
    Open {
        path: PathBuf,
        mode: OpenMode,
        source: io::Error,
    },

    /// A short write counts as a failure, not a partial success.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),

    #[error("failed to stat {path:?}: {source}")]
    Stat { path: PathBuf, source: io::Error },

    #[error("failed to remove {path:?}: {source}")]
    Remove { path: PathBuf, source: io::Error },

    #[error("failed to rename {from:?} to {to:?}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// How `create` opens the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Start from an empty file, discarding existing content.
    #[default]
    Truncate,
    /// Keep existing content and append to it.
    Append,
}

/// Trait for the file primitives the rotating sink needs.
///
/// Abstracted for testing with a mock implementation; the sink is generic
/// over it and owns at most one live handle at a time.
pub trait Filesystem: Send + Sync {
    /// An exclusively owned open file.
    type Handle;

    /// Open `path` for writing, creating parent directories as needed.
    fn create(&self, path: &Path, mode: OpenMode) -> Result<Self::Handle, FsError>;

    /// Write all of `bytes`; accepting fewer bytes than requested is an error.
    fn write_all(&self, handle: &mut Self::Handle, bytes: &[u8]) -> Result<(), FsError>;

    /// Flush buffered data; reach for the OS durability primitive only when
    /// `fsync` is set.
    fn flush(&self, handle: &mut Self::Handle, fsync: bool) -> Result<(), FsError>;

    /// Size of the file at `path` in bytes.
    fn size_of(&self, path: &Path) -> Result<u64, FsError>;

    /// Delete the file at `path`. Best-effort: callers log and continue.
    fn remove(&self, path: &Path) -> Result<(), FsError>;

    /// Move a file. Best-effort: callers log and continue.
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    /// Check if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFilesystem;

impl Filesystem for RealFilesystem {
    type Handle = BufWriter<File>;

    fn create(&self, path: &Path, mode: OpenMode) -> Result<Self::Handle, FsError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| FsError::Open {
                    path: path.to_path_buf(),
                    mode,
                    source,
                })?;
            }
        }

        let mut options = OpenOptions::new();
        match mode {
            OpenMode::Truncate => options.create(true).write(true).truncate(true),
            OpenMode::Append => options.create(true).append(true),
        };

        let file = options.open(path).map_err(|source| FsError::Open {
            path: path.to_path_buf(),
            mode,
            source,
        })?;

        Ok(BufWriter::new(file))
    }

    fn write_all(&self, handle: &mut Self::Handle, bytes: &[u8]) -> Result<(), FsError> {
        handle.write_all(bytes).map_err(FsError::Write)
    }

    fn flush(&self, handle: &mut Self::Handle, fsync: bool) -> Result<(), FsError> {
        handle.flush().map_err(FsError::Write)?;
        if fsync {
            handle.get_ref().sync_all().map_err(FsError::Write)?;
        }
        Ok(())
    }

    fn size_of(&self, path: &Path) -> Result<u64, FsError> {
        fs::metadata(path)
            .map(|metadata| metadata.len())
            .map_err(|source| FsError::Stat {
                path: path.to_path_buf(),
                source,
            })
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        fs::remove_file(path).map_err(|source| FsError::Remove {
            path: path.to_path_buf(),
            source,
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        fs::rename(from, to).map_err(|source| FsError::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Mock filesystem for testing.
///
/// Cloning creates a new handle to the same underlying data. Remove, rename
/// and write failures can be injected to exercise the sink's degraded paths.
#[derive(Debug, Clone, Default)]
pub struct MockFilesystem {
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
    fail_removes: Arc<RwLock<HashSet<PathBuf>>>,
    fail_renames: Arc<RwLock<HashSet<PathBuf>>>,
    fail_creates: Arc<RwLock<HashSet<PathBuf>>>,
    fail_stats: Arc<RwLock<HashSet<PathBuf>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MockFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file directly (for test setup).
    pub fn add_file(&self, path: PathBuf, data: Vec<u8>) {
        self.files.write().unwrap().insert(path, data);
    }

    /// Get content of a specific file.
    pub fn get_file(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// All known paths, sorted for deterministic assertions.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.read().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of files currently present.
    pub fn file_count(&self) -> usize {
        self.files.read().unwrap().len()
    }

    /// Make `remove` fail for `path`.
    pub fn fail_remove_on(&self, path: PathBuf) {
        self.fail_removes.write().unwrap().insert(path);
    }

    /// Make `rename` fail when `from` matches `path`.
    pub fn fail_rename_from(&self, path: PathBuf) {
        self.fail_renames.write().unwrap().insert(path);
    }

    /// Make `create` fail for `path`.
    pub fn fail_create_on(&self, path: PathBuf) {
        self.fail_creates.write().unwrap().insert(path);
    }

    /// Stop failing `create` calls.
    pub fn clear_create_failures(&self) {
        self.fail_creates.write().unwrap().clear();
    }

    /// Make `size_of` fail for `path`.
    pub fn fail_stat_on(&self, path: PathBuf) {
        self.fail_stats.write().unwrap().insert(path);
    }

    /// Make every `write_all` fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Filesystem for MockFilesystem {
    type Handle = PathBuf;

    fn create(&self, path: &Path, mode: OpenMode) -> Result<Self::Handle, FsError> {
        if self.fail_creates.read().unwrap().contains(path) {
            return Err(FsError::Open {
                path: path.to_path_buf(),
                mode,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "injected open failure"),
            });
        }
        let mut files = self.files.write().unwrap();
        match mode {
            OpenMode::Truncate => {
                files.insert(path.to_path_buf(), Vec::new());
            }
            OpenMode::Append => {
                files.entry(path.to_path_buf()).or_default();
            }
        }
        Ok(path.to_path_buf())
    }

    fn write_all(&self, handle: &mut Self::Handle, bytes: &[u8]) -> Result<(), FsError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(FsError::Write(io::Error::other("injected write failure")));
        }
        let mut files = self.files.write().unwrap();
        match files.get_mut(handle.as_path()) {
            Some(content) => {
                content.extend_from_slice(bytes);
                Ok(())
            }
            None => Err(FsError::Write(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no open file at {}", handle.display()),
            ))),
        }
    }

    fn flush(&self, _handle: &mut Self::Handle, _fsync: bool) -> Result<(), FsError> {
        Ok(())
    }

    fn size_of(&self, path: &Path) -> Result<u64, FsError> {
        if self.fail_stats.read().unwrap().contains(path) {
            return Err(FsError::Stat {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "injected stat failure"),
            });
        }
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|content| content.len() as u64)
            .ok_or_else(|| FsError::Stat {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
            })
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        if self.fail_removes.read().unwrap().contains(path) {
            return Err(FsError::Remove {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "injected remove failure"),
            });
        }
        self.files.write().unwrap().remove(path);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        if self.fail_renames.read().unwrap().contains(from) {
            return Err(FsError::Rename {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "injected rename failure"),
            });
        }
        let mut files = self.files.write().unwrap();
        match files.remove(from) {
            Some(content) => {
                files.insert(to.to_path_buf(), content);
                Ok(())
            }
            None => Err(FsError::Rename {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "source does not exist"),
            }),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}
