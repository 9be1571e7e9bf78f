// src/exec/poller.rs

//! Recurring drain-and-check task, one per running handle.
//!
//! The poll loop holds only a `Weak` reference to the handle's shared
//! state: the handle owns the task (through the cancel channel), never the
//! other way round. Ticks for one handle never overlap — a tick runs to
//! completion, including its trailing check/notify, before the next is
//! taken, and a tick that is still in flight when the next is due causes
//! that tick to be skipped, not queued.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::proc::handle::{HandleShared, TickOutcome};

/// Owner-side view of one poll task.
pub(crate) struct PollTask {
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollTask {
    /// Ask the poll loop to stop. Harmless if the loop already finished on
    /// its own (self-cancel after observing termination).
    pub(crate) fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Schedule the recurring poll task for a handle.
pub(crate) fn spawn_poller(shared: Weak<HandleShared>, interval: Duration) -> PollTask {
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(handle) = shared.upgrade() else {
                        trace!("handle dropped; poll task exits");
                        break;
                    };
                    match handle.poll_tick().await {
                        TickOutcome::Continue => {}
                        TickOutcome::Finished => break,
                    }
                }
                _ = &mut cancel_rx => {
                    debug!("poll task cancelled");
                    break;
                }
            }
        }
    });

    PollTask {
        cancel: Some(cancel_tx),
        task,
    }
}
