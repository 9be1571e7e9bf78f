// src/collection.rs

//! Ordered batches of supervised processes.
//!
//! Batch operations fan out over every handle in insertion order and are
//! independent per handle: one handle's failure is reported for that
//! handle and the rest proceed — there is no rollback. Batch behaviour is
//! always an explicit method on the collection, never an implicit
//! broadcast of per-handle properties.

use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::proc::{ProcessHandle, DEFAULT_POLL_INTERVAL};

#[derive(Debug, Default)]
pub struct ProcessCollection {
    handles: Vec<ProcessHandle>,
}

impl ProcessCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: ProcessHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ProcessHandle> {
        self.handles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcessHandle> {
        self.handles.iter()
    }

    /// Start every handle, in order. Per-handle outcomes are returned in
    /// the same order; a failed start is also logged and does not stop the
    /// remaining handles from starting.
    pub async fn start_all(&self) -> Vec<Result<()>> {
        let mut outcomes = Vec::with_capacity(self.handles.len());
        for handle in &self.handles {
            let outcome = handle.start().await;
            if let Err(err) = &outcome {
                warn!(id = %handle.id(), error = %err, "failed to start process");
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Stop every handle, in order. Repeat calls are no-ops per handle.
    /// All handles are attempted; the first error (if any) is returned
    /// after the sweep completes.
    pub async fn stop_all(&self, silent: bool) -> Result<()> {
        let mut first_error = None;
        for handle in &self.handles {
            if let Err(err) = handle.stop(silent).await {
                warn!(id = %handle.id(), error = %err, "failed to stop process");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Run `check` on every handle, in order. Same sweep-then-report
    /// policy as [`stop_all`].
    ///
    /// [`stop_all`]: ProcessCollection::stop_all
    pub async fn check_all(&self, silent: bool) -> Result<()> {
        let mut first_error = None;
        for handle in &self.handles {
            if let Err(err) = handle.check(silent).await {
                warn!(id = %handle.id(), error = %err, "check failed");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Whether any handle still reports a running process.
    pub async fn any_running(&self) -> Result<bool> {
        for handle in &self.handles {
            if handle.is_running().await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Sleep-wait until no handle reports running, then run one final
    /// silent check pass over the whole collection so every exit
    /// notification is guaranteed to have fired.
    pub async fn block_all(&self, poll_interval_override: Option<Duration>) -> Result<()> {
        let interval = poll_interval_override.unwrap_or(DEFAULT_POLL_INTERVAL);
        while self.any_running().await? {
            tokio::time::sleep(interval).await;
        }
        debug!(count = self.handles.len(), "collection idle; final check pass");
        self.check_all(true).await
    }
}

impl IntoIterator for ProcessCollection {
    type Item = ProcessHandle;
    type IntoIter = std::vec::IntoIter<ProcessHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.into_iter()
    }
}

impl<'a> IntoIterator for &'a ProcessCollection {
    type Item = &'a ProcessHandle;
    type IntoIter = std::slice::Iter<'a, ProcessHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

impl FromIterator<ProcessHandle> for ProcessCollection {
    fn from_iter<I: IntoIterator<Item = ProcessHandle>>(iter: I) -> Self {
        Self {
            handles: iter.into_iter().collect(),
        }
    }
}
