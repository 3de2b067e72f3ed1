//! Process tree termination.
//!
//! A tree is never persisted: it is recomputed from a process-table snapshot
//! at the moment of termination, and a pid vanishing between snapshot and
//! signal is silently ignored. Termination is strictly children-before-parent
//! so no child is reparented to init mid-teardown while we still intend to
//! kill it.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use glaunch_core::ports::{ProcessFacility, ProcessRecord};

/// How long terminated processes get to exit before being killed.
const GRACE_POLLS: u32 = 30;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Terminate `root_pid` and every transitive child, leaves first.
///
/// Members still alive after the grace period are force-killed in the same
/// order.
pub async fn terminate_tree(os: &dyn ProcessFacility, root_pid: u32) {
    let snapshot = os.list_processes();
    let order = collect_tree(&snapshot, root_pid);
    debug!(root_pid, members = order.len(), "terminating process tree");

    for &pid in &order {
        os.terminate(pid);
    }

    for _ in 0..GRACE_POLLS {
        if order.iter().all(|&pid| !os.is_alive(pid)) {
            return;
        }
        sleep(POLL_INTERVAL).await;
    }

    for &pid in &order {
        if os.is_alive(pid) {
            warn!(pid, "process did not exit gracefully, killing");
            os.kill(pid);
        }
    }
}

/// Force-kill `root_pid` and every transitive child, leaves first, with no
/// grace period. The stronger sibling of [`terminate_tree`] used by the
/// kill path.
pub async fn kill_tree(os: &dyn ProcessFacility, root_pid: u32) {
    let snapshot = os.list_processes();
    let order = collect_tree(&snapshot, root_pid);
    debug!(root_pid, members = order.len(), "killing process tree");

    for &pid in &order {
        os.kill(pid);
    }
}

/// Terminate every process whose executable basename matches, trees and all.
///
/// The fallback when no handle exists: an elevated primary, or a helper left
/// over from an earlier run that this run never tracked.
pub async fn terminate_by_name(os: &dyn ProcessFacility, basename: &str) {
    let snapshot = os.list_processes();
    let roots: Vec<u32> = snapshot
        .iter()
        .filter(|r| r.name.eq_ignore_ascii_case(basename))
        .map(|r| r.pid)
        .collect();

    if roots.is_empty() {
        debug!(name = %basename, "no processes matched");
        return;
    }

    debug!(name = %basename, matches = roots.len(), "terminating by name");
    for pid in roots {
        terminate_tree(os, pid).await;
    }
}

/// Post-order walk of the snapshot: children recursively, then the root.
/// The visited set guards against parent-link cycles in a stale snapshot.
fn collect_tree(snapshot: &[ProcessRecord], root_pid: u32) -> Vec<u32> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    seen.insert(root_pid);
    visit_children(snapshot, root_pid, &mut seen, &mut order);
    order.push(root_pid);
    order
}

fn visit_children(
    snapshot: &[ProcessRecord],
    parent: u32,
    seen: &mut HashSet<u32>,
    order: &mut Vec<u32>,
) {
    for record in snapshot.iter().filter(|r| r.parent_pid == Some(parent)) {
        if !seen.insert(record.pid) {
            continue;
        }
        visit_children(snapshot, record.pid, seen, order);
        order.push(record.pid);
    }
}
