//! Run-scoped context shared by the engine, actions, control surface, and
//! cleanup guard.
//!
//! All mutable run state lives behind one `tokio::sync::Mutex`: the registry,
//! the furniture flag, the borderless singleton, and the primary-process
//! bookkeeping form a single mutual-exclusion domain, so a tray command and
//! the orchestrator can never terminate the same handle twice or drop one
//! mid-registration.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use glaunch_core::ports::{DesktopShell, Launched, ProcessFacility, ProcessHandle};
use glaunch_core::settings::LauncherSettings;

use crate::lock::InstanceLock;
use crate::registry::ProcessRegistry;
use crate::tree::terminate_tree;

/// Mutable state of one run.
#[derive(Debug, Default)]
pub struct RunState {
    pub registry: ProcessRegistry,
    /// Whether this run hid the desktop furniture (and so owes a restore).
    pub furniture_hidden: bool,
    /// The borderless helper, held outside the registry as a singleton.
    pub borderless: Option<Launched>,
    pub primary_pid: Option<u32>,
    /// Primary executable basename, kept for name-based fallbacks.
    pub primary_exe: Option<String>,
}

/// Everything a component needs to act on the current run.
pub struct LaunchContext {
    pub settings: Arc<LauncherSettings>,
    pub os: Arc<dyn ProcessFacility>,
    pub desktop: Arc<dyn DesktopShell>,
    pub home: PathBuf,
    state: Mutex<RunState>,
    lock: Mutex<Option<InstanceLock>>,
    cleaned_up: AtomicBool,
}

impl LaunchContext {
    #[must_use]
    pub fn new(
        settings: Arc<LauncherSettings>,
        os: Arc<dyn ProcessFacility>,
        desktop: Arc<dyn DesktopShell>,
        home: PathBuf,
        lock: Option<InstanceLock>,
    ) -> Self {
        Self {
            settings,
            os,
            desktop,
            home,
            state: Mutex::new(RunState::default()),
            lock: Mutex::new(lock),
            cleaned_up: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().await
    }

    /// Flip the cleaned-up flag; returns whether cleanup had already run.
    pub(crate) fn mark_cleaned(&self) -> bool {
        self.cleaned_up.swap(true, Ordering::SeqCst)
    }

    pub(crate) async fn take_lock(&self) -> Option<InstanceLock> {
        self.lock.lock().await.take()
    }

    /// Track a spawned helper under a logical name.
    ///
    /// A same-named entry from earlier in the run is terminated (whole tree)
    /// before being replaced: the explicit duplicate policy, in place of the
    /// silent handle leak this design historically had.
    pub async fn track(&self, name: &str, handle: Box<dyn ProcessHandle>) {
        let mut state = self.state.lock().await;
        if let Some(mut displaced) = state.registry.add(name, handle) {
            warn!(
                name,
                old_pid = ?displaced.handle.pid(),
                "superseding tracked process with the same name"
            );
            if let Some(pid) = displaced.handle.pid() {
                terminate_tree(self.os.as_ref(), pid).await;
            }
            if let Err(e) = displaced.handle.shutdown().await {
                debug!(name, error = %e, "failed to reap superseded process");
            }
        }
    }

    /// Terminate and detach a tracked helper. Returns whether it was tracked.
    pub async fn stop_tracked(&self, name: &str) -> bool {
        let mut state = self.state.lock().await;
        let Some(mut tracked) = state.registry.remove(name) else {
            return false;
        };
        if let Some(pid) = tracked.handle.pid() {
            terminate_tree(self.os.as_ref(), pid).await;
        }
        if let Err(e) = tracked.handle.shutdown().await {
            debug!(name, error = %e, "failed to reap stopped process");
        }
        true
    }
}
