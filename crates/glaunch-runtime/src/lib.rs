//! Process runtime and run orchestration for glaunch.
//!
//! This crate owns everything between the domain types in `glaunch-core` and
//! the OS: the tokio/sysinfo-backed process facility, the process registry,
//! process-tree termination, the single-instance lock, the sequence engine
//! with its built-in actions, the control-command channel, the cleanup guard,
//! and the session supervisor that strings them together around one run.

pub mod actions;
pub mod backup;
pub mod cleanup;
pub mod context;
pub mod control;
pub mod engine;
pub mod facility;
pub mod lock;
pub mod registry;
pub mod session;
mod shutdown;
pub mod tree;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use actions::{Action, ActionRegistry};
pub use cleanup::cleanup;
pub use context::{LaunchContext, RunState};
pub use control::{ControlCommand, ControlHandle, control_channel};
pub use engine::run_sequence;
pub use facility::SystemProcessFacility;
pub use lock::{InstanceLock, LockError};
pub use registry::{ProcessRegistry, TrackedProcess};
pub use session::Session;
pub use tree::{kill_tree, terminate_by_name, terminate_tree};
