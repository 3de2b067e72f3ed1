//! Single-instance lock.
//!
//! A pid file at a well-known path under the launcher home. Staleness must
//! never block a start: a lock whose owner is dead (or whose content is
//! unreadable) is reclaimed by overwriting. Writes are atomic via temp file
//! + rename so a concurrent reader never sees a half-written pid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use glaunch_core::ports::ProcessFacility;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("another launcher instance is running (pid {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("failed to write lock file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A held single-instance lock. Released explicitly by the cleanup guard;
/// `Drop` is only the safety net for abnormal unwinds.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    held: bool,
}

impl InstanceLock {
    /// Acquire the lock, reclaiming it when the recorded owner is dead.
    ///
    /// Fails with [`LockError::AlreadyRunning`] without touching the file
    /// when the recorded owner is a live process other than ourselves.
    pub fn acquire(
        path: impl Into<PathBuf>,
        current_pid: u32,
        os: &dyn ProcessFacility,
    ) -> Result<Self, LockError> {
        let path = path.into();

        if let Some(owner) = read_owner(&path) {
            if owner != current_pid && os.is_alive(owner) {
                return Err(LockError::AlreadyRunning { pid: owner });
            }
            debug!(owner, "reclaiming stale instance lock");
        }

        write_owner(&path, current_pid)?;
        info!(path = %path.display(), pid = current_pid, "instance lock acquired");
        Ok(Self { path, held: true })
    }

    /// Delete the lock file. A missing file is not an error; repeated calls
    /// are no-ops.
    pub fn release(&mut self) -> io::Result<()> {
        if !self.held {
            return Ok(());
        }
        self.held = false;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "instance lock released");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if self.held {
            warn!(path = %self.path.display(), "instance lock dropped without release");
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Stored owner pid, or `None` when the file is absent or unparsable
/// (unparsable counts as stale).
fn read_owner(path: &Path) -> Option<u32> {
    let content = fs::read_to_string(path).ok()?;
    content.lines().next()?.trim().parse().ok()
}

fn write_owner(path: &Path, pid: u32) -> Result<(), LockError> {
    let io_err = |source| LockError::Io {
        path: path.to_path_buf(),
        source,
    };

    let temp_path = path.with_extension("pid.tmp");
    fs::write(&temp_path, format!("{pid}\n")).map_err(io_err)?;
    fs::rename(&temp_path, path).map_err(io_err)
}
