// src/watch/tracker.rs

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tracing::{debug, trace};

use crate::errors::PollError;
use crate::fs::FileSystem;
use crate::watch::snapshot::ChangeSnapshot;
use crate::watch::watch_set::WatchSet;

/// How many times a failed stat is retried before giving up.
pub const STAT_RETRIES: u32 = 3;

/// Base backoff between stat retries; attempt `n` waits `n * STAT_BACKOFF`.
pub const STAT_BACKOFF: Duration = Duration::from_millis(10);

/// Reads modification times for a `WatchSet`.
///
/// Editors that save by delete-then-recreate leave a short window where the
/// file does not exist. Failed stats are therefore retried with a linear
/// backoff before surfacing as a [`PollError`].
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    fs: Arc<dyn FileSystem>,
}

impl ChangeTracker {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Stat every path in `watch_set`.
    ///
    /// Either every path gets an entry, or the whole snapshot fails.
    pub async fn snapshot(&self, watch_set: &WatchSet) -> Result<ChangeSnapshot, PollError> {
        let mut snapshot = ChangeSnapshot::new();
        for path in watch_set.iter() {
            let modified = self.modified_with_retry(path).await?;
            snapshot.insert(path.to_path_buf(), modified);
        }
        trace!(paths = snapshot.len(), "snapshot taken");
        Ok(snapshot)
    }

    async fn modified_with_retry(&self, path: &Path) -> Result<SystemTime, PollError> {
        let mut attempt = 1;
        loop {
            match self.fs.modified(path) {
                Ok(modified) => return Ok(modified),
                Err(source) if attempt > STAT_RETRIES => {
                    return Err(PollError {
                        path: path.to_path_buf(),
                        source,
                    });
                }
                Err(err) => {
                    debug!(?path, attempt, error = %err, "stat failed; retrying");
                    tokio::time::sleep(STAT_BACKOFF * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}
