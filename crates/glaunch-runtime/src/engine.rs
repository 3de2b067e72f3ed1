//! Sequence orchestration engine.
//!
//! One sequence runs to completion, one token at a time; a handler does not
//! start until its predecessor returns. Nothing here aborts the sequence:
//! unknown tokens and handler failures are reported and skipped.

use tracing::{debug, info, warn};

use glaunch_core::sequence::SequenceSpec;

use crate::actions::ActionRegistry;
use crate::context::LaunchContext;

/// Dispatch every token of a sequence, left to right.
pub async fn run_sequence(
    cx: &LaunchContext,
    actions: &ActionRegistry,
    spec: &SequenceSpec,
    is_exit: bool,
) {
    if spec.is_empty() {
        debug!(is_exit, "sequence is empty, nothing to dispatch");
        return;
    }
    info!(is_exit, tokens = spec.len(), "running sequence");

    for token in spec.tokens() {
        match actions.resolve(token) {
            Some(action) => {
                debug!(action = %token, is_exit, "dispatching action");
                if let Err(e) = action.run(cx, is_exit).await {
                    warn!(action = %token, error = %e, "action failed, continuing sequence");
                }
            }
            None => warn!(action = %token, "unknown action, skipping"),
        }
    }
}
