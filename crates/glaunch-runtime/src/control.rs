//! Control-command channel.
//!
//! The external control surface (tray menu, Ctrl-C bridge) never touches
//! process handles; it sends one of four commands and the session supervisor
//! acts on them. Only the orchestrator side mutates registry state.

use tokio::sync::mpsc;
use tracing::warn;

/// Commands a control surface may send into a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Run the exit sequence and terminate the primary process.
    Stop,
    /// Terminate the primary immediately and drain the registry, bypassing
    /// sequences. Stronger than and independent of any in-flight sequence.
    Kill,
    /// Tear the run down (exit sequence) and start it again.
    Restart,
    /// Same teardown as `Stop`; named separately so surfaces can distinguish
    /// "stop the game" from "quit the launcher".
    Exit,
}

/// Cloneable sender half handed to control surfaces.
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: mpsc::Sender<ControlCommand>,
}

impl ControlHandle {
    pub fn send(&self, command: ControlCommand) {
        if self.tx.try_send(command).is_err() {
            warn!(?command, "control channel full or closed, command dropped");
        }
    }

    pub fn stop(&self) {
        self.send(ControlCommand::Stop);
    }

    pub fn kill(&self) {
        self.send(ControlCommand::Kill);
    }

    pub fn restart(&self) {
        self.send(ControlCommand::Restart);
    }

    pub fn exit(&self) {
        self.send(ControlCommand::Exit);
    }
}

/// Create the channel pair for one session.
#[must_use]
pub fn control_channel() -> (ControlHandle, mpsc::Receiver<ControlCommand>) {
    let (tx, rx) = mpsc::channel(8);
    (ControlHandle { tx }, rx)
}
