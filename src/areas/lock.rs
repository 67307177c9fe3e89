//! Repository-wide exclusive locks
//!
//! A lock is a file created with `create_new` inside `.gible/`, so it excludes
//! other threads and other processes alike. The holder's PID is written into the
//! file to make stale locks easy to diagnose. The file is removed when the guard
//! is dropped, on every exit path of the operation holding it.

use crate::errors::GibleError;
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Interval between two acquisition attempts
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Lock guarding refs, the staging index and the object stores
pub const REPOSITORY_LOCK: &str = "LOCK";

/// Lock guarding the working tree during switch, merge and rollback
pub const WORKTREE_LOCK: &str = "WORKTREE_LOCK";

#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Acquire the lock at `path`, polling until `timeout` elapses.
    pub async fn acquire(path: &Path, timeout: Duration) -> anyhow::Result<Self> {
        let started = Instant::now();

        loop {
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
            {
                Ok(mut file) => {
                    writeln!(file, "{}", std::process::id())
                        .with_context(|| format!("failed to write lock file {}", path.display()))?;
                    tracing::trace!(lock = %path.display(), "lock acquired");

                    return Ok(LockGuard {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if started.elapsed() >= timeout {
                        let holder = std::fs::read_to_string(path).unwrap_or_default();
                        tracing::warn!(
                            lock = %path.display(),
                            holder = holder.trim(),
                            "gave up waiting for lock"
                        );

                        return Err(GibleError::LockTimeout {
                            path: path.to_path_buf(),
                            timeout,
                        }
                        .into());
                    }

                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("failed to create lock file {}", path.display()));
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release lock");
        } else {
            tracing::trace!(lock = %self.path.display(), "lock released");
        }
    }
}
