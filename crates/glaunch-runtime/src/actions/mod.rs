//! The built-in action set and the dispatcher they register with.
//!
//! Every sequence token resolves to one handler. A handler that needs
//! launch-on-enter / teardown-on-exit symmetry branches on `is_exit`
//! internally, so the same token can appear in both sequence strings.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use glaunch_core::settings::HookSlot;

use crate::context::LaunchContext;

mod borderless;
mod hooks;
mod kill;
mod mapper;
mod monitor;
mod taskbar;

pub use borderless::Borderless;
pub use hooks::RunHook;
pub use kill::{KillGame, KillList};
pub use mapper::ControllerMapper;
pub use monitor::MonitorConfig;
pub use taskbar::{HideTaskbar, ShowTaskbar};

/// One dispatchable action.
///
/// Errors are reported by the engine and never abort the rest of the
/// sequence.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(&self, cx: &LaunchContext, is_exit: bool) -> Result<()>;
}

/// Name → handler mapping. Unknown names are the engine's problem (reported,
/// not fatal), so `resolve` simply returns nothing.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, action: Arc<dyn Action>) {
        self.actions.insert(name.into(), action);
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// Registry with the full built-in action set.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register("Controller-Mapper", Arc::new(ControllerMapper));
        registry.register("Monitor-Config", Arc::new(MonitorConfig));
        registry.register("No-TB", Arc::new(HideTaskbar));
        registry.register("Taskbar", Arc::new(ShowTaskbar));
        registry.register("Borderless", Arc::new(Borderless));
        registry.register("Kill-Game", Arc::new(KillGame));
        registry.register("Kill-List", Arc::new(KillList));
        for slot in [
            HookSlot::Pre1,
            HookSlot::Pre2,
            HookSlot::Pre3,
            HookSlot::Post1,
            HookSlot::Post2,
            HookSlot::Post3,
            HookSlot::JustAfterLaunch,
            HookSlot::JustBeforeExit,
        ] {
            registry.register(slot.key(), Arc::new(RunHook::new(slot)));
        }
        registry
    }
}
