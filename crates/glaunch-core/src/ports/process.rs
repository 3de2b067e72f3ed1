//! Process facility port.
//!
//! Defines the launcher's view of the OS process table: spawn a command,
//! enumerate processes with parent links, signal by pid, probe liveness.
//! Implementations handle platform details internally.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the process facility and by process handles.
#[derive(Debug, Clone, Error)]
pub enum ProcessError {
    /// The command's executable does not exist or is not on the search path.
    #[error("executable not found: {0}")]
    NotFound(String),

    /// The OS refused to start the process.
    #[error("failed to spawn {program}: {reason}")]
    SpawnFailed { program: String, reason: String },

    /// Waiting on a child failed (the child was already reaped, or the OS
    /// reported an error).
    #[error("failed to wait on process: {0}")]
    WaitFailed(String),

    /// A signal could not be delivered.
    #[error("failed to signal pid {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },

    /// The elevated-launch path failed or is unsupported on this platform.
    #[error("elevated launch failed: {0}")]
    ElevationFailed(String),
}

/// A fully resolved command line: program, arguments, working directory.
///
/// Building one from the settings' path/options/arguments strings is the
/// settings layer's job; the facility only executes what it is given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Executable basename, used for name-based termination fallbacks.
    #[must_use]
    pub fn program_basename(&self) -> String {
        self.program
            .file_name()
            .map_or_else(|| self.program.display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One row of a process-table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub parent_pid: Option<u32>,
    /// Executable basename, as reported by the OS.
    pub name: String,
}

/// An owned handle to one spawned process.
///
/// The holder is the only party allowed to wait on or shut down the process;
/// tree-wide termination goes through the facility by pid.
#[async_trait]
pub trait ProcessHandle: Send {
    /// Pid of the process, when the OS reported one at spawn time.
    fn pid(&self) -> Option<u32>;

    /// Wait for the process to exit; returns its exit code when available.
    async fn wait(&mut self) -> Result<Option<i32>, ProcessError>;

    /// Terminate the process this handle owns (graceful, escalating) and
    /// reap it. Safe to call when the process has already exited.
    async fn shutdown(&mut self) -> Result<(), ProcessError>;
}

/// Outcome of launching the primary process.
///
/// The elevation path hands the process to the OS shell and gets no handle
/// back, so later termination must fall back to the executable name. Keeping
/// the two shapes in one sum type forces every consumer to handle the
/// fallback branch explicitly.
pub enum Launched {
    Tracked(Box<dyn ProcessHandle>),
    Untrackable { exe_name: String },
}

impl Launched {
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Tracked(handle) => handle.pid(),
            Self::Untrackable { .. } => None,
        }
    }
}

impl fmt::Debug for Launched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracked(handle) => f.debug_tuple("Tracked").field(&handle.pid()).finish(),
            Self::Untrackable { exe_name } => {
                f.debug_struct("Untrackable").field("exe_name", exe_name).finish()
            }
        }
    }
}

/// OS process facility.
///
/// Spawning and elevation are async (the runtime backs them with
/// `tokio::process`); snapshot, signalling and liveness are synchronous
/// point-in-time operations. Signalling a pid that has already exited is not
/// an error anywhere in this interface.
#[async_trait]
pub trait ProcessFacility: Send + Sync {
    /// Spawn a command and return an owned handle to it.
    async fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError>;

    /// Spawn a command elevated. No handle is returned; the caller must track
    /// the process by executable name if it needs to terminate it later.
    async fn elevate_and_spawn(&self, spec: &CommandSpec) -> Result<(), ProcessError>;

    /// Snapshot the process table (pid, parent pid, executable basename).
    fn list_processes(&self) -> Vec<ProcessRecord>;

    /// Politely request termination of a pid. Best-effort.
    fn terminate(&self, pid: u32);

    /// Forcefully kill a pid. Best-effort.
    fn kill(&self, pid: u32);

    /// Whether a pid currently refers to a live process.
    fn is_alive(&self, pid: u32) -> bool;
}
