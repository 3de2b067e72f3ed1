//! Desktop shell port.

use tracing::debug;

/// Control over shell-level desktop furniture (the taskbar).
///
/// The core only needs the boolean capability; how visibility is actually
/// toggled is a platform collaborator's concern.
pub trait DesktopShell: Send + Sync {
    fn set_taskbar_visible(&self, visible: bool);
}

/// No-op shell for platforms without taskbar control and for headless runs.
pub struct NoopDesktopShell;

impl DesktopShell for NoopDesktopShell {
    fn set_taskbar_visible(&self, visible: bool) {
        debug!(visible, "taskbar visibility change ignored (no desktop shell)");
    }
}
