// src/errors.rs

//! Crate-wide error taxonomy and `Result` alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The OS refused to create the process (executable missing, not
    /// executable, ...). Distinct from a process that spawns and then exits
    /// non-zero, which is a normal lifecycle transition.
    #[error("failed to spawn process '{id}': {source}")]
    SpawnError {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// Operation not valid for the handle's current lifecycle state
    /// (double start, start after exit, ...).
    #[error("invalid lifecycle operation: {0}")]
    LifecycleError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProcwatchError>;
