// src/proc/mod.rs

//! Process description and the supervised handle.

pub mod handle;
pub mod options;
pub mod spec;

pub use handle::ProcessHandle;
pub use options::{DEFAULT_POLL_INTERVAL, DEFAULT_WRAP_COLUMNS, SuperviseOptions};
pub use spec::{CommandLine, ProcessSpec, ProcessSpecBuilder};
