// src/types.rs

use std::fmt;

/// Lifecycle state of a supervised process.
///
/// Transitions are strictly forward:
/// `Created --start()--> Running --(exit observed | stop())--> Exited`,
/// and `Exited` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Constructed but not yet started.
    Created,
    /// The OS process has been spawned and has not yet been observed to
    /// terminate.
    Running,
    /// Termination has been observed (organic exit or forced stop).
    Exited,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Created => write!(f, "created"),
            ProcessState::Running => write!(f, "running"),
            ProcessState::Exited => write!(f, "exited"),
        }
    }
}

/// Which of the two output pipes a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::Stdout => write!(f, "stdout"),
            StreamSource::Stderr => write!(f, "stderr"),
        }
    }
}
