//! CLI bootstrap - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together: the real
//! process facility, the desktop shell, the instance-lock gate, and the
//! settings file all meet here and come out as a ready-to-run context.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use tracing::{debug, info};

use glaunch_core::paths::{lock_file_path, settings_candidates};
use glaunch_core::ports::{DesktopShell, NoopDesktopShell, ProcessFacility};
use glaunch_core::settings::{LauncherSettings, validate_settings};
use glaunch_runtime::{ActionRegistry, InstanceLock, LaunchContext, SystemProcessFacility};

use crate::parser::Cli;

/// Fully composed application context.
pub struct App {
    pub cx: Arc<LaunchContext>,
    pub actions: ActionRegistry,
}

/// Resolve the launcher home: the `--home` override, else the directory the
/// launcher binary lives in, else the working directory.
pub fn resolve_home(cli_home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(home) = cli_home {
        return Ok(home);
    }
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            return Ok(dir.to_path_buf());
        }
    }
    env::current_dir().context("cannot determine launcher home directory")
}

/// Load and validate the settings file.
///
/// A missing or unreadable settings file is fatal: nothing has been started
/// yet and running sequences against empty settings helps nobody.
pub fn load_settings(cli: &Cli, home: &Path) -> Result<LauncherSettings> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => settings_candidates(home, cli.target.as_deref())
            .into_iter()
            .find(|candidate| candidate.is_file())
            .context("no settings file found (glaunch.json)")?,
    };
    info!(path = %path.display(), "loading settings");

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("reading settings file {}", path.display()))?;
    let mut settings = LauncherSettings::from_json_str(&raw)
        .with_context(|| format!("parsing settings file {}", path.display()))?;
    validate_settings(&settings)?;

    // The command-line target wins over the configured executable.
    if let Some(target) = &cli.target {
        settings.game.executable = Some(target.display().to_string());
    }
    if settings.game.executable.is_none() {
        bail!("no game to launch: pass a target or configure game.executable");
    }

    Ok(settings)
}

/// Compose the run context: instance-lock gate first, then settings.
pub fn bootstrap(cli: &Cli) -> Result<App> {
    let home = resolve_home(cli.home.clone())?;
    debug!(home = %home.display(), "launcher home resolved");

    let os: Arc<dyn ProcessFacility> = Arc::new(SystemProcessFacility::new());

    let lock = if cli.multi_instance {
        info!("single-instance check skipped");
        None
    } else {
        Some(InstanceLock::acquire(
            lock_file_path(&home),
            std::process::id(),
            os.as_ref(),
        )?)
    };

    let settings = load_settings(cli, &home)?;

    let desktop: Arc<dyn DesktopShell> = Arc::new(NoopDesktopShell);
    let cx = Arc::new(LaunchContext::new(
        Arc::new(settings),
        os,
        desktop,
        home,
        lock,
    ));

    Ok(App {
        cx,
        actions: ActionRegistry::builtin(),
    })
}
