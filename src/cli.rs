// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `procwatch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procwatch",
    version,
    about = "Supervise external processes: spawn, drain their output, report their exits.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Procwatch.toml` in the current working directory. Ignored
    /// when an ad-hoc command is given after `--`.
    #[arg(long, value_name = "PATH", default_value = "Procwatch.toml")]
    pub config: String,

    /// Parse + validate, print the process table, but don't execute
    /// anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Stop every process once this many seconds have elapsed.
    ///
    /// There is no built-in per-process timeout; this composes the
    /// collection's block with an external deadline and a stop-all.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Ad-hoc mode: supervise this single command (given after `--`)
    /// instead of reading a config file.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
