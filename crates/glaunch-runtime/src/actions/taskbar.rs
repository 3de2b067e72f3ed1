//! Desktop-furniture actions (`No-TB` / `Taskbar`).

use anyhow::Result;
use async_trait::async_trait;

use crate::actions::Action;
use crate::context::LaunchContext;

/// Hide the taskbar for the run, when the settings ask for it. Remembers
/// that this run owes a restore.
pub struct HideTaskbar;

#[async_trait]
impl Action for HideTaskbar {
    async fn run(&self, cx: &LaunchContext, _is_exit: bool) -> Result<()> {
        if !cx.settings.options.hide_taskbar {
            return Ok(());
        }
        let mut state = cx.state().await;
        cx.desktop.set_taskbar_visible(false);
        state.furniture_hidden = true;
        Ok(())
    }
}

/// Show the taskbar. Unconditional: restoring furniture is always safe.
pub struct ShowTaskbar;

#[async_trait]
impl Action for ShowTaskbar {
    async fn run(&self, cx: &LaunchContext, _is_exit: bool) -> Result<()> {
        let mut state = cx.state().await;
        cx.desktop.set_taskbar_visible(true);
        state.furniture_hidden = false;
        Ok(())
    }
}
