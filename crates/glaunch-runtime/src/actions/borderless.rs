//! Borderless-helper action.
//!
//! The helper itself is spawned by the session *after* the primary process,
//! so the launch-side token only announces intent; the exit side owns the
//! teardown of the singleton held in the run state.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use glaunch_core::ports::Launched;
use glaunch_core::settings::BorderlessMode;

use crate::actions::Action;
use crate::context::LaunchContext;
use crate::tree::{terminate_by_name, terminate_tree};

pub struct Borderless;

#[async_trait]
impl Action for Borderless {
    async fn run(&self, cx: &LaunchContext, is_exit: bool) -> Result<()> {
        let options = &cx.settings.options;

        if !is_exit {
            if options.borderless != BorderlessMode::Off {
                info!("borderless helper will start after the game launches");
            }
            return Ok(());
        }

        if !options.terminate_borderless_on_exit || options.borderless == BorderlessMode::Keep {
            debug!("borderless helper left running");
            return Ok(());
        }

        let taken = cx.state().await.borderless.take();
        match taken {
            Some(Launched::Tracked(mut handle)) => {
                if let Some(pid) = handle.pid() {
                    terminate_tree(cx.os.as_ref(), pid).await;
                }
                if let Err(e) = handle.shutdown().await {
                    debug!(error = %e, "failed to reap borderless helper");
                }
            }
            Some(Launched::Untrackable { exe_name }) => {
                terminate_by_name(cx.os.as_ref(), &exe_name).await;
            }
            None => {
                // Never tracked this run; fall back to the configured tool name.
                let tool = &cx.settings.tools.borderless;
                if tool.is_configured() {
                    terminate_by_name(cx.os.as_ref(), &tool.basename()).await;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_context;
    use glaunch_core::settings::{LauncherSettings, ToolSettings};

    fn borderless_settings(mode: BorderlessMode, terminate: bool) -> LauncherSettings {
        let mut settings = LauncherSettings::default();
        settings.options.borderless = mode;
        settings.options.terminate_borderless_on_exit = terminate;
        settings.tools.borderless = ToolSettings {
            path: "/opt/borderless/borderless.exe".to_string(),
            ..Default::default()
        };
        settings
    }

    #[tokio::test]
    async fn exit_terminates_tracked_helper_when_configured() {
        let (cx, os, _) = test_context(borderless_settings(BorderlessMode::Enabled, true));
        let helper = os.add_process(200, None, "borderless.exe");
        cx.state().await.borderless = Some(Launched::Tracked(Box::new(helper)));

        Borderless.run(&cx, true).await.expect("exit failed");
        assert!(os.terminated().contains(&200));
        assert!(cx.state().await.borderless.is_none());
    }

    #[tokio::test]
    async fn keep_mode_overrides_terminate_flag() {
        let (cx, os, _) = test_context(borderless_settings(BorderlessMode::Keep, true));
        let helper = os.add_process(200, None, "borderless.exe");
        cx.state().await.borderless = Some(Launched::Tracked(Box::new(helper)));

        Borderless.run(&cx, true).await.expect("exit failed");
        assert!(os.terminated().is_empty());
    }

    #[tokio::test]
    async fn exit_falls_back_to_name_when_untracked() {
        let (cx, os, _) = test_context(borderless_settings(BorderlessMode::Enabled, true));
        os.add_record(201, None, "borderless.exe");

        Borderless.run(&cx, true).await.expect("exit failed");
        assert!(os.terminated().contains(&201));
    }

    #[tokio::test]
    async fn launch_side_spawns_nothing() {
        let (cx, os, _) = test_context(borderless_settings(BorderlessMode::Enabled, true));
        Borderless.run(&cx, false).await.expect("launch failed");
        assert!(os.spawned_names().is_empty());
    }
}
