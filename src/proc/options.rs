// src/proc/options.rs

use std::time::Duration;

use crate::errors::{ProcwatchError, Result};

/// Default poll interval between drain-and-check ticks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Default wrap width for printed output lines.
pub const DEFAULT_WRAP_COLUMNS: usize = 80;

/// Per-handle supervision options.
///
/// All fields have defaults; chain the builder methods to override:
///
/// ```rust
/// use procwatch::proc::SuperviseOptions;
///
/// let opts = SuperviseOptions::new()
///     .id("worker")
///     .keep_stdout(true)
///     .print_stderr(false);
/// assert_eq!(opts.id, "worker");
/// ```
#[derive(Debug, Clone)]
pub struct SuperviseOptions {
    /// Display label used to prefix printed lines and tag the exit event.
    /// Not required to be unique; default empty (no prefix).
    pub id: String,

    /// Print drained stdout lines to the standard output channel.
    pub print_stdout: bool,

    /// Print drained stderr lines to the standard output channel.
    pub print_stderr: bool,

    /// Retain drained stdout lines in memory. Unbounded: a long-lived
    /// verbose process will grow this without limit.
    pub keep_stdout: bool,

    /// Retain drained stderr lines in memory (same caveat).
    pub keep_stderr: bool,

    /// Wrap width for printed lines. Only used when printing.
    pub wrap_columns: usize,

    /// Start the process immediately on handle construction.
    pub auto_start: bool,

    /// Interval between poll ticks for this handle.
    pub poll_interval: Duration,
}

impl Default for SuperviseOptions {
    fn default() -> Self {
        Self {
            id: String::new(),
            print_stdout: true,
            print_stderr: true,
            keep_stdout: false,
            keep_stderr: false,
            wrap_columns: DEFAULT_WRAP_COLUMNS,
            auto_start: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SuperviseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn print_stdout(mut self, yes: bool) -> Self {
        self.print_stdout = yes;
        self
    }

    pub fn print_stderr(mut self, yes: bool) -> Self {
        self.print_stderr = yes;
        self
    }

    pub fn keep_stdout(mut self, yes: bool) -> Self {
        self.keep_stdout = yes;
        self
    }

    pub fn keep_stderr(mut self, yes: bool) -> Self {
        self.keep_stderr = yes;
        self
    }

    pub fn wrap_columns(mut self, columns: usize) -> Self {
        self.wrap_columns = columns;
        self
    }

    pub fn auto_start(mut self, yes: bool) -> Self {
        self.auto_start = yes;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sanity-check option values. Called once at handle construction.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(ProcwatchError::ConfigError(
                "poll_interval must be positive".to_string(),
            ));
        }
        if self.wrap_columns == 0 {
            return Err(ProcwatchError::ConfigError(
                "wrap_columns must be >= 1 (got 0)".to_string(),
            ));
        }
        Ok(())
    }
}
