//! The single cleanup path.
//!
//! Every way a run can end (normal exit, stop, kill, startup failure)
//! funnels through [`cleanup`]. It runs its side effects exactly once no
//! matter how many paths reach it.

use tracing::{debug, info, warn};

use glaunch_core::ports::Launched;
use glaunch_core::settings::BorderlessMode;

use crate::context::LaunchContext;
use crate::tree::{terminate_by_name, terminate_tree};

/// Restore desktop furniture, drain the registry, release the borderless
/// singleton, release the instance lock. Idempotent.
pub async fn cleanup(cx: &LaunchContext) {
    if cx.mark_cleaned() {
        debug!("cleanup already ran, skipping");
        return;
    }
    info!("running cleanup");

    {
        let mut state = cx.state().await;

        if state.furniture_hidden {
            cx.desktop.set_taskbar_visible(true);
            state.furniture_hidden = false;
        }

        state.registry.drain_and_terminate_all(cx.os.as_ref()).await;

        if let Some(launched) = state.borderless.take() {
            release_borderless(cx, launched).await;
        }
    }

    if let Some(mut lock) = cx.take_lock().await {
        if let Err(e) = lock.release() {
            warn!(error = %e, "failed to release instance lock");
        }
    }
}

/// Release the borderless helper: terminate it when configured to, otherwise
/// drop the handle and leave it running on purpose.
async fn release_borderless(cx: &LaunchContext, launched: Launched) {
    let options = &cx.settings.options;
    let keep = !options.terminate_borderless_on_exit || options.borderless == BorderlessMode::Keep;

    match launched {
        Launched::Tracked(mut handle) => {
            if keep {
                debug!(pid = ?handle.pid(), "leaving borderless helper running");
                return;
            }
            if let Some(pid) = handle.pid() {
                terminate_tree(cx.os.as_ref(), pid).await;
            }
            if let Err(e) = handle.shutdown().await {
                debug!(error = %e, "failed to reap borderless helper");
            }
        }
        Launched::Untrackable { exe_name } => {
            if keep {
                return;
            }
            terminate_by_name(cx.os.as_ref(), &exe_name).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_context;
    use glaunch_core::settings::LauncherSettings;
    use glaunch_core::ProcessFacility;

    #[tokio::test]
    async fn cleanup_restores_furniture_and_drains_registry() {
        let (cx, os, desktop) = test_context(LauncherSettings::default());
        let helper = os.add_process(40, None, "helper");
        {
            let mut state = cx.state().await;
            state.furniture_hidden = true;
            state.registry.add("helper", Box::new(helper));
        }

        cleanup(&cx).await;

        assert_eq!(desktop.calls(), vec![true]);
        assert!(os.terminated().contains(&40));
        assert!(cx.state().await.registry.is_empty());
    }

    #[tokio::test]
    async fn cleanup_runs_exactly_once() {
        let (cx, os, desktop) = test_context(LauncherSettings::default());
        {
            let mut state = cx.state().await;
            state.furniture_hidden = true;
            let helper = os.add_process(40, None, "helper");
            state.registry.add("helper", Box::new(helper));
        }

        cleanup(&cx).await;
        let terminations = os.terminated().len();
        cleanup(&cx).await;

        assert_eq!(desktop.calls(), vec![true], "furniture restored once");
        assert_eq!(os.terminated().len(), terminations, "no duplicate signals");
    }

    #[tokio::test]
    async fn cleanup_without_hidden_furniture_leaves_desktop_alone() {
        let (cx, _os, desktop) = test_context(LauncherSettings::default());
        cleanup(&cx).await;
        assert!(desktop.calls().is_empty());
    }

    #[tokio::test]
    async fn cleanup_terminates_borderless_when_configured() {
        let mut settings = LauncherSettings::default();
        settings.options.terminate_borderless_on_exit = true;
        let (cx, os, _) = test_context(settings);

        let helper = os.add_process(55, None, "borderless");
        cx.state().await.borderless = Some(Launched::Tracked(Box::new(helper)));

        cleanup(&cx).await;
        assert!(os.terminated().contains(&55));
    }

    #[tokio::test]
    async fn cleanup_keeps_borderless_by_default() {
        let (cx, os, _) = test_context(LauncherSettings::default());
        let helper = os.add_process(55, None, "borderless");
        cx.state().await.borderless = Some(Launched::Tracked(Box::new(helper)));

        cleanup(&cx).await;
        assert!(!os.terminated().contains(&55));
        assert!(os.is_alive(55), "helper intentionally left running");
    }
}
