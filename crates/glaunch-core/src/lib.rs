//! Core domain types and port definitions for glaunch.
//!
//! This crate is adapter-free: it defines what a launch run *is* (settings,
//! sequences, command specs) and the capabilities the orchestration layer
//! needs from the outside world (process facility, desktop shell). The
//! concrete OS adapters live in `glaunch-runtime`.

pub mod paths;
pub mod ports;
pub mod sequence;
pub mod settings;

// Re-export commonly used types for convenience
pub use ports::{
    CommandSpec, DesktopShell, Launched, NoopDesktopShell, ProcessError, ProcessFacility,
    ProcessHandle, ProcessRecord,
};
pub use sequence::{DEFAULT_EXIT_SEQUENCE, DEFAULT_LAUNCH_SEQUENCE, SequenceSpec};
pub use settings::{
    BorderlessMode, GameSettings, HookSettings, HookSlot, LauncherSettings, SettingsError,
    ToolSettings, validate_settings,
};
