//! Filesystem abstraction for rotolog.
//!
//! This crate provides:
//! - A `Filesystem` trait wrapping the file primitives the rotating sink
//!   needs (open, bounded write, size query, rename, delete, flush)
//! - Real and mock implementations, the mock with failure injection so the
//!   best-effort cleanup paths are testable
//! - Pure naming functions producing a rotated file's path from a base path
//!   plus a timestamp and/or a numeric index

pub mod adapter;
pub mod naming;

pub use adapter::{Filesystem, FsError, MockFilesystem, OpenMode, RealFilesystem};
pub use naming::{append_date_suffix, append_index_suffix, split_stem_extension};
