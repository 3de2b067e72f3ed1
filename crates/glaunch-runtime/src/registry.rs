//! Registry of spawned-but-not-yet-reaped helper processes.
//!
//! The registry is the sole owner of the handles it holds; nothing else may
//! wait on or terminate them. It is plain data: signalling goes through the
//! facility passed into [`ProcessRegistry::drain_and_terminate_all`], and
//! duplicate-name policy is the caller's, with `add` handing back the
//! displaced entry instead of silently dropping its handle.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, info};

use glaunch_core::ports::{ProcessFacility, ProcessHandle};

use crate::tree::terminate_tree;

/// One tracked helper process.
pub struct TrackedProcess {
    pub name: String,
    pub handle: Box<dyn ProcessHandle>,
}

impl fmt::Debug for TrackedProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedProcess")
            .field("name", &self.name)
            .field("pid", &self.handle.pid())
            .finish()
    }
}

/// Name-keyed collection of tracked processes.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    entries: HashMap<String, TrackedProcess>,
}

impl ProcessRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a process under a logical name.
    ///
    /// When the name is already tracked the previous entry is returned; the
    /// caller must terminate it (the registry never drops a live handle on
    /// the floor).
    pub fn add(
        &mut self,
        name: impl Into<String>,
        handle: Box<dyn ProcessHandle>,
    ) -> Option<TrackedProcess> {
        let name = name.into();
        debug!(name = %name, pid = ?handle.pid(), "tracking process");
        self.entries
            .insert(name.clone(), TrackedProcess { name, handle })
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<&TrackedProcess> {
        self.entries.get(name)
    }

    /// Detach an entry without terminating it; the caller takes ownership.
    pub fn remove(&mut self, name: &str) -> Option<TrackedProcess> {
        self.entries.remove(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Terminate every tracked process tree (children first), reap the
    /// handles, and clear the registry.
    ///
    /// Idempotent: a second call sees an empty registry and signals nothing.
    pub async fn drain_and_terminate_all(&mut self, os: &dyn ProcessFacility) {
        if self.entries.is_empty() {
            return;
        }
        info!(count = self.entries.len(), "terminating tracked processes");

        for (name, mut tracked) in self.entries.drain() {
            if let Some(pid) = tracked.handle.pid() {
                terminate_tree(os, pid).await;
            }
            if let Err(e) = tracked.handle.shutdown().await {
                debug!(name = %name, error = %e, "failed to reap tracked process");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProcessFacility;

    #[test]
    fn add_find_remove_round_trip() {
        let os = FakeProcessFacility::new();
        let handle = os.add_process(41, None, "helper");

        let mut registry = ProcessRegistry::new();
        assert!(registry.add("mapper", Box::new(handle)).is_none());

        let found = registry.find("mapper").expect("not found");
        assert_eq!(found.handle.pid(), Some(41));

        assert!(registry.remove("mapper").is_some());
        assert!(registry.find("mapper").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_add_returns_displaced_entry() {
        let os = FakeProcessFacility::new();
        let first = os.add_process(41, None, "helper");
        let second = os.add_process(42, None, "helper");

        let mut registry = ProcessRegistry::new();
        registry.add("mapper", Box::new(first));
        let displaced = registry
            .add("mapper", Box::new(second))
            .expect("no displaced entry");

        assert_eq!(displaced.handle.pid(), Some(41));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("mapper").unwrap().handle.pid(), Some(42));
    }

    #[tokio::test]
    async fn drain_terminates_trees_and_is_idempotent() {
        let os = FakeProcessFacility::new();
        let helper = os.add_process(50, None, "helper");
        os.add_record(51, Some(50), "helper-child");
        let other = os.add_process(60, None, "other");

        let mut registry = ProcessRegistry::new();
        registry.add("helper", Box::new(helper));
        registry.add("other", Box::new(other));

        registry.drain_and_terminate_all(&os).await;
        assert!(registry.is_empty());

        let terminated = os.terminated();
        assert!(terminated.contains(&50));
        assert!(terminated.contains(&51));
        assert!(terminated.contains(&60));
        let pos = |pid: u32| terminated.iter().position(|&p| p == pid).unwrap();
        assert!(pos(51) < pos(50), "child terminated before its parent");

        // Second drain must not signal anything further.
        let calls_before = os.terminated().len();
        registry.drain_and_terminate_all(&os).await;
        assert!(registry.is_empty());
        assert_eq!(os.terminated().len(), calls_before);
    }
}
