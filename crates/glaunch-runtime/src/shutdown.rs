//! Graceful shutdown for owned `tokio::process::Child` handles, with
//! SIGTERM → SIGKILL escalation on Unix.

use tokio::process::Child;

use glaunch_core::ProcessError;

#[cfg(unix)]
use std::time::Duration;
#[cfg(unix)]
use tokio::time::timeout;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Grace period between the polite request and the forced kill.
#[cfg(unix)]
const TERM_GRACE: Duration = Duration::from_secs(5);

/// Shut down a child process and reap it.
///
/// Unix: SIGTERM, wait up to the grace period, then SIGKILL and reap.
/// Elsewhere: immediate kill (no graceful signal available), then reap.
/// A child that already exited is reaped without error.
pub async fn shutdown_child(child: &mut Child) -> Result<(), ProcessError> {
    #[cfg(unix)]
    {
        shutdown_unix(child).await
    }

    #[cfg(not(unix))]
    {
        shutdown_forced(child).await
    }
}

#[cfg(unix)]
async fn shutdown_unix(child: &mut Child) -> Result<(), ProcessError> {
    let Some(pid) = child.id() else {
        // Already reaped by a previous wait.
        return Ok(());
    };

    if let Err(e) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        if e == nix::errno::Errno::ESRCH {
            reap(child).await?;
            return Ok(());
        }
        return Err(ProcessError::SignalFailed {
            pid,
            reason: e.to_string(),
        });
    }

    match timeout(TERM_GRACE, child.wait()).await {
        Ok(result) => result
            .map(|_| ())
            .map_err(|e| ProcessError::WaitFailed(e.to_string())),
        // Grace period elapsed, escalate.
        Err(_) => shutdown_forced(child).await,
    }
}

async fn shutdown_forced(child: &mut Child) -> Result<(), ProcessError> {
    child
        .kill()
        .await
        .map_err(|e| ProcessError::WaitFailed(e.to_string()))?;
    reap(child).await
}

async fn reap(child: &mut Child) -> Result<(), ProcessError> {
    child
        .wait()
        .await
        .map(|_| ())
        .map_err(|e| ProcessError::WaitFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::process::Command;
    use tokio::time::sleep;

    #[tokio::test]
    #[cfg(unix)]
    async fn shutdown_responds_to_sigterm() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        shutdown_child(&mut child).await.expect("shutdown failed");
    }

    #[tokio::test]
    async fn shutdown_handles_already_exited() {
        let mut child = Command::new("echo")
            .arg("test")
            .spawn()
            .expect("failed to spawn echo");

        sleep(Duration::from_millis(100)).await;

        shutdown_child(&mut child).await.expect("shutdown failed");
    }
}
