//! Generic hook actions (`Pre1`–`Pre3`, `Post1`–`Post3`, `JustAfterLaunch`,
//! `JustBeforeExit`): run the configured tool, either blocking until it
//! exits or tracking it for later teardown.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use glaunch_core::settings::HookSlot;

use crate::actions::Action;
use crate::context::LaunchContext;

pub struct RunHook {
    slot: HookSlot,
}

impl RunHook {
    #[must_use]
    pub fn new(slot: HookSlot) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl Action for RunHook {
    async fn run(&self, cx: &LaunchContext, _is_exit: bool) -> Result<()> {
        let hook = cx.settings.hooks.slot(self.slot);
        if !hook.is_configured() {
            debug!(slot = self.slot.key(), "hook not configured, skipping");
            return Ok(());
        }

        let spec = hook.command();
        let mut handle = cx.os.spawn(&spec).await?;

        if hook.wait {
            let code = handle.wait().await?;
            if let Some(code) = code
                && code != 0
            {
                warn!(slot = self.slot.key(), code, "hook exited with failure");
            }
        } else {
            cx.track(self.slot.key(), handle).await;
        }
        Ok(())
    }
}
