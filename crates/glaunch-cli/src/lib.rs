//! CLI adapter for glaunch.
//!
//! `parser` defines the argument surface, `bootstrap` is the composition
//! root that wires settings and ports into a [`glaunch_runtime::Session`].

pub mod bootstrap;
pub mod parser;

pub use bootstrap::{App, bootstrap, load_settings, resolve_home};
pub use parser::Cli;
