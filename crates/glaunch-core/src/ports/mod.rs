//! Port definitions for the orchestration core.
//!
//! Ports express intent, not mechanism: the runtime crate supplies the
//! OS-backed implementations, tests supply recording fakes.

mod desktop;
mod process;

pub use desktop::{DesktopShell, NoopDesktopShell};
pub use process::{
    CommandSpec, Launched, ProcessError, ProcessFacility, ProcessHandle, ProcessRecord,
};
