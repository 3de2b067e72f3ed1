//! OS-backed process facility: tokio for spawning and waiting, sysinfo for
//! process-table snapshots, signals via nix on Unix.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use glaunch_core::ports::{
    CommandSpec, ProcessError, ProcessFacility, ProcessHandle, ProcessRecord,
};

use crate::shutdown::shutdown_child;

/// The real process facility.
#[derive(Debug, Default)]
pub struct SystemProcessFacility;

impl SystemProcessFacility {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Handle around a spawned `tokio::process::Child`.
///
/// The pid is cached at spawn time: `Child::id()` goes `None` once the child
/// has been reaped, but tree termination may still need the value.
struct ChildHandle {
    child: Child,
    pid: Option<u32>,
}

#[async_trait]
impl ProcessHandle for ChildHandle {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
        self.child
            .wait()
            .await
            .map(|status| status.code())
            .map_err(|e| ProcessError::WaitFailed(e.to_string()))
    }

    async fn shutdown(&mut self) -> Result<(), ProcessError> {
        shutdown_child(&mut self.child).await
    }
}

#[async_trait]
impl ProcessFacility for SystemProcessFacility {
    async fn spawn(&self, spec: &CommandSpec) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        // Helpers run detached from our stdio; capturing output of a process
        // nobody reads would fill the pipe and stall it.
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ProcessError::NotFound(spec.program.display().to_string())
            } else {
                ProcessError::SpawnFailed {
                    program: spec.program.display().to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let pid = child.id();
        info!(program = %spec.program.display(), pid = ?pid, "spawned process");
        Ok(Box::new(ChildHandle { child, pid }))
    }

    async fn elevate_and_spawn(&self, spec: &CommandSpec) -> Result<(), ProcessError> {
        #[cfg(windows)]
        {
            // Start-Process hands the launch to the shell; the resulting
            // process is not a child of ours and no handle comes back.
            let mut command = format!("Start-Process '{}'", spec.program.display());
            if !spec.args.is_empty() {
                let list = spec
                    .args
                    .iter()
                    .map(|a| format!("'{a}'"))
                    .collect::<Vec<_>>()
                    .join(",");
                command.push_str(&format!(" -ArgumentList {list}"));
            }
            if let Some(dir) = &spec.cwd {
                command.push_str(&format!(" -WorkingDirectory '{}'", dir.display()));
            }
            command.push_str(" -Verb RunAs");

            let status = Command::new("powershell")
                .arg("-NoProfile")
                .arg("-Command")
                .arg(&command)
                .status()
                .await
                .map_err(|e| ProcessError::ElevationFailed(e.to_string()))?;
            if status.success() {
                Ok(())
            } else {
                Err(ProcessError::ElevationFailed(format!(
                    "powershell exited with {status}"
                )))
            }
        }

        #[cfg(not(windows))]
        {
            let _ = spec;
            Err(ProcessError::ElevationFailed(
                "elevated launch is only supported on Windows".to_string(),
            ))
        }
    }

    fn list_processes(&self) -> Vec<ProcessRecord> {
        let sys = sysinfo::System::new_all();
        sys.processes()
            .iter()
            .map(|(pid, process)| ProcessRecord {
                pid: pid.as_u32(),
                parent_pid: process.parent().map(sysinfo::Pid::as_u32),
                name: process.name().to_string_lossy().into_owned(),
            })
            .collect()
    }

    fn terminate(&self, pid: u32) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            match signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) => debug!(pid, "requested termination"),
                // Already gone; not an error anywhere in this interface.
                Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => warn!(pid, error = %e, "failed to request termination"),
            }
        }

        #[cfg(not(unix))]
        {
            let sys = sysinfo::System::new_all();
            if let Some(process) = sys.process(sysinfo::Pid::from_u32(pid)) {
                process.kill();
                debug!(pid, "requested termination");
            }
        }
    }

    fn kill(&self, pid: u32) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{self, Signal};
            use nix::unistd::Pid;

            match signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                Ok(()) => debug!(pid, "killed process"),
                Err(nix::errno::Errno::ESRCH) => {}
                Err(e) => warn!(pid, error = %e, "failed to kill process"),
            }
        }

        #[cfg(not(unix))]
        {
            let sys = sysinfo::System::new_all();
            if let Some(process) = sys.process(sysinfo::Pid::from_u32(pid)) {
                process.kill();
                debug!(pid, "killed process");
            }
        }
    }

    fn is_alive(&self, pid: u32) -> bool {
        #[cfg(unix)]
        {
            use nix::sys::signal;
            use nix::unistd::Pid;

            // Null signal: checks deliverability without sending anything.
            match signal::kill(Pid::from_raw(pid as i32), None) {
                Ok(()) => true,
                Err(nix::errno::Errno::ESRCH) => false,
                // Process exists but we lack permission.
                Err(_) => true,
            }
        }

        #[cfg(not(unix))]
        {
            let sys = sysinfo::System::new_all();
            sys.process(sysinfo::Pid::from_u32(pid)).is_some()
        }
    }
}
