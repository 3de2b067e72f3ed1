//! Recording fakes for the core ports, shared by the runtime's tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use glaunch_core::ports::{
    CommandSpec, DesktopShell, ProcessError, ProcessFacility, ProcessHandle, ProcessRecord,
};
use glaunch_core::settings::LauncherSettings;

use crate::context::LaunchContext;

#[derive(Default)]
struct Inner {
    records: Mutex<Vec<ProcessRecord>>,
    terminated: Mutex<Vec<u32>>,
    killed: Mutex<Vec<u32>>,
    spawn_log: Mutex<Vec<String>>,
    persistent: Mutex<Vec<String>>,
}

impl Inner {
    fn remove(&self, pid: u32) {
        self.records.lock().unwrap().retain(|r| r.pid != pid);
    }

    fn contains(&self, pid: u32) -> bool {
        self.records.lock().unwrap().iter().any(|r| r.pid == pid)
    }
}

/// In-memory process table. Processes die instantly on terminate/kill, which
/// keeps grace-period polls from slowing tests down.
pub(crate) struct FakeProcessFacility {
    inner: Arc<Inner>,
    next_pid: AtomicU32,
    elevation_succeeds: bool,
}

impl FakeProcessFacility {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner::default()),
            next_pid: AtomicU32::new(1000),
            elevation_succeeds: false,
        }
    }

    pub fn with_records(records: Vec<ProcessRecord>) -> Self {
        let facility = Self::new();
        *facility.inner.records.lock().unwrap() = records;
        facility
    }

    pub fn with_elevation(mut self) -> Self {
        self.elevation_succeeds = true;
        self
    }

    /// Add a table row without creating a handle (an untracked descendant).
    pub fn add_record(&self, pid: u32, parent_pid: Option<u32>, name: &str) {
        self.inner.records.lock().unwrap().push(ProcessRecord {
            pid,
            parent_pid,
            name: name.to_string(),
        });
    }

    /// Add a table row and return an owned handle to it.
    pub fn add_process(&self, pid: u32, parent_pid: Option<u32>, name: &str) -> FakeHandle {
        self.add_record(pid, parent_pid, name);
        FakeHandle {
            inner: Arc::clone(&self.inner),
            pid,
            outlives_wait: false,
        }
    }

    /// Programs whose spawned handles behave like long-running processes:
    /// `wait` blocks until something removes them from the table.
    pub fn mark_persistent(&self, basename: &str) {
        self.inner
            .persistent
            .lock()
            .unwrap()
            .push(basename.to_string());
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.inner.terminated.lock().unwrap().clone()
    }

    pub fn killed(&self) -> Vec<u32> {
        self.inner.killed.lock().unwrap().clone()
    }

    /// Basenames of every process spawned through the facility, in order.
    pub fn spawn_log(&self) -> Vec<String> {
        self.inner.spawn_log.lock().unwrap().clone()
    }

    pub fn spawned_names(&self) -> Vec<String> {
        self.inner
            .records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }
}

#[async_trait]
impl ProcessFacility for FakeProcessFacility {
    async fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        if spec.program.starts_with("/missing") {
            return Err(ProcessError::NotFound(spec.program.display().to_string()));
        }
        let basename = spec.program_basename();
        self.inner.spawn_log.lock().unwrap().push(basename.clone());
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let mut handle = self.add_process(pid, None, &basename);
        handle.outlives_wait = self.inner.persistent.lock().unwrap().contains(&basename);
        Ok(Box::new(handle))
    }

    async fn elevate_and_spawn(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        if self.elevation_succeeds {
            let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
            self.add_record(pid, None, &spec.program_basename());
            Ok(())
        } else {
            Err(ProcessError::ElevationFailed("not supported".to_string()))
        }
    }

    fn list_processes(&self) -> Vec<ProcessRecord> {
        self.inner.records.lock().unwrap().clone()
    }

    fn terminate(&self, pid: u32) {
        self.inner.terminated.lock().unwrap().push(pid);
        self.inner.remove(pid);
    }

    fn kill(&self, pid: u32) {
        self.inner.killed.lock().unwrap().push(pid);
        self.inner.remove(pid);
    }

    fn is_alive(&self, pid: u32) -> bool {
        self.inner.contains(pid)
    }
}

pub(crate) struct FakeHandle {
    inner: Arc<Inner>,
    pid: u32,
    outlives_wait: bool,
}

#[async_trait]
impl ProcessHandle for FakeHandle {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
        if self.outlives_wait {
            while self.inner.contains(self.pid) {
                sleep(Duration::from_millis(5)).await;
            }
            return Ok(None);
        }
        self.inner.remove(self.pid);
        Ok(Some(0))
    }

    async fn shutdown(&mut self) -> Result<(), ProcessError> {
        self.inner.remove(self.pid);
        Ok(())
    }
}

/// Desktop shell that records every visibility call.
#[derive(Default)]
pub(crate) struct RecordingDesktop {
    calls: Mutex<Vec<bool>>,
}

impl RecordingDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().unwrap().clone()
    }
}

impl DesktopShell for RecordingDesktop {
    fn set_taskbar_visible(&self, visible: bool) {
        self.calls.lock().unwrap().push(visible);
    }
}

/// A context wired to fakes, plus the fakes themselves for assertions.
pub(crate) fn test_context(
    settings: LauncherSettings,
) -> (
    Arc<LaunchContext>,
    Arc<FakeProcessFacility>,
    Arc<RecordingDesktop>,
) {
    let os = Arc::new(FakeProcessFacility::new());
    let desktop = Arc::new(RecordingDesktop::new());
    let cx = Arc::new(LaunchContext::new(
        Arc::new(settings),
        Arc::clone(&os) as _,
        Arc::clone(&desktop) as _,
        PathBuf::from("/tmp/glaunch-test-home"),
        None,
    ));
    (cx, os, desktop)
}
