//! Name-based termination actions (`Kill-Game`, `Kill-List`).

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::actions::Action;
use crate::context::LaunchContext;
use crate::tree::terminate_by_name;

/// Terminate the primary process by executable name. The sequence-level
/// fallback for primaries the run has no handle to (elevated launches,
/// leftovers from a crashed run).
pub struct KillGame;

#[async_trait]
impl Action for KillGame {
    async fn run(&self, cx: &LaunchContext, _is_exit: bool) -> Result<()> {
        let exe = {
            let state = cx.state().await;
            state.primary_exe.clone()
        }
        .or_else(|| {
            cx.settings
                .game_command()
                .map(|spec| spec.program_basename())
        });

        match exe {
            Some(exe) => {
                info!(exe = %exe, "killing game by name");
                terminate_by_name(cx.os.as_ref(), &exe).await;
            }
            None => debug!("no game executable known, nothing to kill"),
        }
        Ok(())
    }
}

/// Terminate every executable on the configured kill list.
pub struct KillList;

#[async_trait]
impl Action for KillList {
    async fn run(&self, cx: &LaunchContext, _is_exit: bool) -> Result<()> {
        let options = &cx.settings.options;
        if !options.use_kill_list {
            debug!("kill list disabled, skipping");
            return Ok(());
        }
        for name in &options.kill_list {
            info!(name = %name, "killing process from list");
            terminate_by_name(cx.os.as_ref(), name.trim()).await;
        }
        Ok(())
    }
}
