// src/watch/mod.rs

//! Poll-based change detection.
//!
//! This module is responsible for:
//! - Building the deduplicated `WatchSet` from explicit paths and globs.
//! - Taking `ChangeSnapshot`s (path -> mtime) with retry on flaky stats.
//! - Diffing two snapshots into the set of changed paths.
//!
//! It does **not** know about units or the pipeline; it only turns
//! filesystem timestamps into sets of changed paths.

pub mod path_utils;
pub mod patterns;
pub mod snapshot;
pub mod tracker;
pub mod watch_set;

pub use patterns::WatchPatterns;
pub use snapshot::{diff, ChangeSnapshot};
pub use tracker::ChangeTracker;
pub use watch_set::WatchSet;
