//! Controller-mapper action: spawn-and-track on launch, terminate on exit.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::actions::Action;
use crate::context::LaunchContext;
use crate::tree::terminate_by_name;

/// Registry key for the tracked mapper process.
pub(crate) const MAPPER_KEY: &str = "controller-mapper";

pub struct ControllerMapper;

#[async_trait]
impl Action for ControllerMapper {
    async fn run(&self, cx: &LaunchContext, is_exit: bool) -> Result<()> {
        let mapper = &cx.settings.tools.controller_mapper;

        if is_exit {
            if cx.stop_tracked(MAPPER_KEY).await {
                return Ok(());
            }
            // Nothing tracked: a mapper may still be alive from an earlier
            // run that never got to its exit sequence.
            if mapper.tool.is_configured() {
                terminate_by_name(cx.os.as_ref(), &mapper.tool.basename()).await;
            }
            return Ok(());
        }

        let Some(spec) = mapper.command() else {
            debug!("controller mapper not configured, skipping");
            return Ok(());
        };
        let handle = cx.os.spawn(&spec).await?;
        cx.track(MAPPER_KEY, handle).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_context;
    use glaunch_core::settings::{LauncherSettings, MapperSettings, ToolSettings};

    fn mapper_settings() -> LauncherSettings {
        let mut settings = LauncherSettings::default();
        settings.tools.controller_mapper = MapperSettings {
            tool: ToolSettings {
                path: "/opt/antimicrox/antimicrox".to_string(),
                ..Default::default()
            },
            player1_profile: "p1.amgp".to_string(),
            player2_profile: String::new(),
        };
        settings
    }

    #[tokio::test]
    async fn launch_spawns_and_tracks_the_mapper() {
        let (cx, os, _) = test_context(mapper_settings());
        ControllerMapper.run(&cx, false).await.expect("run failed");

        assert!(cx.state().await.registry.find(MAPPER_KEY).is_some());
        assert!(os.spawned_names().contains(&"antimicrox".to_string()));
    }

    #[tokio::test]
    async fn exit_terminates_the_tracked_mapper() {
        let (cx, os, _) = test_context(mapper_settings());
        ControllerMapper.run(&cx, false).await.expect("launch failed");
        let pid = cx
            .state()
            .await
            .registry
            .find(MAPPER_KEY)
            .and_then(|t| t.handle.pid())
            .expect("no tracked pid");

        ControllerMapper.run(&cx, true).await.expect("exit failed");
        assert!(cx.state().await.registry.is_empty());
        assert!(os.terminated().contains(&pid));
    }

    #[tokio::test]
    async fn exit_falls_back_to_name_based_termination() {
        let (cx, os, _) = test_context(mapper_settings());
        // A mapper from a previous run, never tracked by this one.
        os.add_record(300, None, "antimicrox");

        ControllerMapper.run(&cx, true).await.expect("exit failed");
        assert!(os.terminated().contains(&300));
    }

    #[tokio::test]
    async fn unconfigured_mapper_is_a_no_op() {
        let (cx, os, _) = test_context(LauncherSettings::default());
        ControllerMapper.run(&cx, false).await.expect("run failed");
        assert!(cx.state().await.registry.is_empty());
        assert!(os.spawned_names().is_empty());
    }
}
