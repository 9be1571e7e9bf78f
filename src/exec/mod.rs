// src/exec/mod.rs

//! Stream draining and the per-handle poll task.

pub mod drainer;
pub(crate) mod poller;

pub use drainer::{Drained, StreamDrainer};
