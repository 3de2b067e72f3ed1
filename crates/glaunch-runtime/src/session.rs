//! Session supervisor: one run, from launch sequence to cleanup.
//!
//! Owns the run loop and the control-command receiver. The flow is the
//! classic one: launch sequence → spawn the game → supervise until it exits
//! or a control command ends it → exit sequence → cleanup. Restart loops
//! back to the top; kill short-circuits straight to cleanup.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::{info, warn};

use glaunch_core::ports::Launched;
use glaunch_core::settings::BorderlessMode;

use crate::actions::ActionRegistry;
use crate::backup::backup_saves;
use crate::cleanup::cleanup;
use crate::context::LaunchContext;
use crate::control::ControlCommand;
use crate::engine::run_sequence;
use crate::tree::{kill_tree, terminate_by_name, terminate_tree};

/// Poll cadence while supervising a primary we have no handle to.
const UNTRACKED_POLL: Duration = Duration::from_secs(2);
/// Polls to wait for an elevated primary to appear before giving up on it.
const UNTRACKED_STARTUP_POLLS: u32 = 15;

enum Outcome {
    PrimaryExited,
    Stopped,
    Killed,
    Restart,
}

pub struct Session {
    cx: Arc<LaunchContext>,
    actions: ActionRegistry,
    control: mpsc::Receiver<ControlCommand>,
    exit_sequence_ran: bool,
}

impl Session {
    #[must_use]
    pub fn new(
        cx: Arc<LaunchContext>,
        actions: ActionRegistry,
        control: mpsc::Receiver<ControlCommand>,
    ) -> Self {
        Self {
            cx,
            actions,
            control,
            exit_sequence_ran: false,
        }
    }

    /// Run the session to completion. Cleanup runs on every path out,
    /// including errors.
    pub async fn run(mut self) -> Result<()> {
        let result = self.run_inner().await;
        cleanup(&self.cx).await;
        result
    }

    async fn run_inner(&mut self) -> Result<()> {
        if let Err(e) = backup_saves(&self.cx.settings, &self.cx.home) {
            warn!(error = %e, "save backup failed, continuing");
        }

        loop {
            self.exit_sequence_ran = false;
            run_sequence(
                &self.cx,
                &self.actions,
                &self.cx.settings.effective_launch_sequence(),
                false,
            )
            .await;

            let launched = match self.launch_primary().await {
                Ok(launched) => launched,
                Err(e) => {
                    warn!(error = %e, "failed to launch the game, tearing down");
                    break;
                }
            };
            self.launch_borderless().await;

            match self.supervise(launched).await {
                // Kill already ran cleanup; nothing left to tear down.
                Outcome::Killed => return Ok(()),
                Outcome::Restart => {
                    info!("restarting run");
                    continue;
                }
                Outcome::PrimaryExited | Outcome::Stopped => break,
            }
        }

        self.run_exit_sequence().await;
        self.kill_list_sweep().await;
        Ok(())
    }

    async fn launch_primary(&self) -> Result<Launched> {
        let settings = &self.cx.settings;
        let spec = settings
            .game_command()
            .context("no game executable configured")?;
        let exe = spec.program_basename();
        info!(game = %settings.game_display_name(), command = %spec, "launching game");

        if settings.options.run_as_admin {
            match self.cx.os.elevate_and_spawn(&spec).await {
                Ok(()) => {
                    info!(exe = %exe, "game launched elevated; no handle, tracking by name");
                    let mut state = self.cx.state().await;
                    state.primary_pid = None;
                    state.primary_exe = Some(exe.clone());
                    return Ok(Launched::Untrackable { exe_name: exe });
                }
                Err(e) => warn!(error = %e, "elevated launch failed, spawning normally"),
            }
        }

        let handle = self.cx.os.spawn(&spec).await?;
        let mut state = self.cx.state().await;
        state.primary_pid = handle.pid();
        state.primary_exe = Some(exe);
        Ok(Launched::Tracked(handle))
    }

    /// The borderless helper starts after the game so it has a window to
    /// operate on. Held as a singleton in the run state, not the registry.
    async fn launch_borderless(&self) {
        let settings = &self.cx.settings;
        if settings.options.borderless == BorderlessMode::Off {
            return;
        }
        let tool = &settings.tools.borderless;
        if !tool.is_configured() {
            warn!("borderless mode is set but no tool is configured");
            return;
        }
        match self.cx.os.spawn(&tool.command()).await {
            Ok(handle) => {
                info!(pid = ?handle.pid(), "borderless helper started");
                self.cx.state().await.borderless = Some(Launched::Tracked(handle));
            }
            Err(e) => warn!(error = %e, "failed to start borderless helper"),
        }
    }

    async fn supervise(&mut self, launched: Launched) -> Outcome {
        match launched {
            Launched::Tracked(mut handle) => {
                tokio::select! {
                    status = handle.wait() => {
                        match status {
                            Ok(code) => info!(code = ?code, "game exited"),
                            Err(e) => warn!(error = %e, "failed waiting on the game"),
                        }
                        self.cx.state().await.primary_pid = None;
                        Outcome::PrimaryExited
                    }
                    Some(command) = self.control.recv() => {
                        self.handle_command(command).await
                    }
                }
            }
            Launched::Untrackable { exe_name } => self.supervise_by_name(&exe_name).await,
        }
    }

    /// Supervision fallback for an elevated primary: watch the process table
    /// for the executable basename, with a startup grace for it to appear.
    async fn supervise_by_name(&mut self, exe_name: &str) -> Outcome {
        let mut appeared = false;
        let mut startup_polls = 0u32;
        loop {
            tokio::select! {
                Some(command) = self.control.recv() => {
                    return self.handle_command(command).await;
                }
                _ = sleep(UNTRACKED_POLL) => {
                    let alive = self
                        .cx
                        .os
                        .list_processes()
                        .iter()
                        .any(|r| r.name.eq_ignore_ascii_case(exe_name));
                    if alive {
                        appeared = true;
                    } else if appeared {
                        info!(exe = %exe_name, "game no longer running");
                        return Outcome::PrimaryExited;
                    } else {
                        startup_polls += 1;
                        if startup_polls >= UNTRACKED_STARTUP_POLLS {
                            warn!(exe = %exe_name, "game never appeared after elevated launch");
                            return Outcome::PrimaryExited;
                        }
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, command: ControlCommand) -> Outcome {
        match command {
            ControlCommand::Stop | ControlCommand::Exit => {
                info!("stop requested");
                self.run_exit_sequence().await;
                self.terminate_primary(false).await;
                Outcome::Stopped
            }
            ControlCommand::Kill => {
                warn!("kill requested, bypassing sequences");
                self.terminate_primary(true).await;
                self.kill_list_sweep().await;
                cleanup(&self.cx).await;
                Outcome::Killed
            }
            ControlCommand::Restart => {
                info!("restart requested");
                self.run_exit_sequence().await;
                self.terminate_primary(false).await;
                Outcome::Restart
            }
        }
    }

    async fn terminate_primary(&self, force: bool) {
        let (pid, exe) = {
            let state = self.cx.state().await;
            (state.primary_pid, state.primary_exe.clone())
        };

        if let Some(pid) = pid {
            if force {
                kill_tree(self.cx.os.as_ref(), pid).await;
            } else {
                terminate_tree(self.cx.os.as_ref(), pid).await;
            }
        } else if let Some(exe) = exe {
            // Elevation path: no pid, only a name.
            terminate_by_name(self.cx.os.as_ref(), &exe).await;
        }

        self.cx.state().await.primary_pid = None;
    }

    /// The exit sequence runs at most once per launch round, whichever of
    /// the stop path or the normal path gets there first.
    async fn run_exit_sequence(&mut self) {
        if self.exit_sequence_ran {
            return;
        }
        self.exit_sequence_ran = true;
        run_sequence(
            &self.cx,
            &self.actions,
            &self.cx.settings.effective_exit_sequence(),
            true,
        )
        .await;
    }

    async fn kill_list_sweep(&self) {
        let options = &self.cx.settings.options;
        if !options.use_kill_list {
            return;
        }
        for name in &options.kill_list {
            terminate_by_name(self.cx.os.as_ref(), name.trim()).await;
        }
    }
}
