//! Cosmetic progress while a request is in flight.
//!
//! The ticker only reads controller state. It never decides when a
//! submission ends; the controller's own transitions do.

use std::time::Duration;

use client_core::{ControllerSnapshot, LifecycleController};
use tracing::warn;

pub const STEPS: [&str; 4] = [
    "Analyzing student performance...",
    "Reviewing learning outcomes...",
    "Identifying skill gaps...",
    "Generating personalized plan...",
];

pub const STEP_INTERVAL: Duration = Duration::from_millis(1500);

/// Follows the controller until the submission settles. Ctrl-C cancels it.
pub async fn follow_submission(
    controller: &LifecycleController,
    interval: Duration,
) -> ControllerSnapshot {
    let mut rx = controller.subscribe();
    let mut ticker = tokio::time::interval(interval);
    let mut step = 0;

    loop {
        let snapshot = rx.borrow_and_update().clone();
        if !snapshot.phase.is_submitting() {
            return snapshot;
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    return controller.snapshot();
                }
            }
            _ = ticker.tick() => {
                if let Some(text) = STEPS.get(step) {
                    eprintln!("  {text}");
                    step += 1;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("interrupted; cancelling the plan request");
                controller.reset();
            }
        }
    }
}
