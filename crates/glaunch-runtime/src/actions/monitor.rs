//! Monitor-layout action: load the gaming layout on launch, the desktop
//! layout on exit. The tool is always awaited; layouts must be in place
//! before the sequence continues.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::actions::Action;
use crate::context::LaunchContext;

pub struct MonitorConfig;

#[async_trait]
impl Action for MonitorConfig {
    async fn run(&self, cx: &LaunchContext, is_exit: bool) -> Result<()> {
        let monitor = &cx.settings.tools.monitor;
        let config = if is_exit {
            &monitor.desktop_config
        } else {
            &monitor.gaming_config
        };

        let Some(spec) = monitor.load_command(config) else {
            debug!(is_exit, "monitor tool or layout not configured, skipping");
            return Ok(());
        };

        let mut handle = cx.os.spawn(&spec).await?;
        let code = handle.wait().await?;
        if let Some(code) = code
            && code != 0
        {
            warn!(code, "monitor tool exited with failure");
        }
        Ok(())
    }
}
