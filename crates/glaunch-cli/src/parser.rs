//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Launch a game with pre/post action sequences and guaranteed teardown of
/// every helper process the run starts.
#[derive(Parser, Debug)]
#[command(name = "glaunch")]
#[command(about = "Launch a game with pre/post action sequences and guaranteed teardown")]
#[command(version)]
pub struct Cli {
    /// Game executable or shortcut to launch (overrides the configured
    /// executable)
    pub target: Option<PathBuf>,

    /// Override the launcher home directory (lock file, saves, backups)
    #[arg(long)]
    pub home: Option<PathBuf>,

    /// Explicit settings file (default: glaunch.json next to the target,
    /// then in the launcher home)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Skip the single-instance check
    #[arg(long)]
    pub multi_instance: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
