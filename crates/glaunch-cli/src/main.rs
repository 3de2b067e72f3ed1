//! CLI entry point.
//!
//! Wires the control channel to Ctrl-C (first press stops, second kills) and
//! hands the composed context to the session supervisor. The tray menu, when
//! present, talks to the same channel through its own `ControlHandle`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use glaunch_cli::{Cli, bootstrap};
use glaunch_runtime::{Session, control_channel};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Compose the run context (instance-lock gate, settings, ports)
    let app = bootstrap(&cli)?;

    // Control surface: Ctrl-C asks for a stop, a second Ctrl-C kills.
    let (control, control_rx) = control_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping run");
            control.stop();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("second interrupt, killing run");
            control.kill();
        }
    });

    Session::new(app.cx, app.actions, control_rx).run().await
}
