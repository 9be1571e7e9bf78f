// src/proc/spec.rs

//! Immutable description of what to run.
//!
//! The command is a tagged union: either a single shell-style command line
//! (handed to the platform shell, which performs the word splitting) or an
//! explicit argument vector (no further splitting — required whenever an
//! argument may itself contain whitespace). The two forms are never
//! silently coerced into each other.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::errors::{ProcwatchError, Result};

/// How the command to execute is expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// One shell-style command line, e.g. `"ping -c 4 localhost"`.
    ///
    /// Executed through the platform shell (`sh -c` on unix, `cmd /C` on
    /// windows), which is what performs argument splitting.
    Shell(String),

    /// Explicit argument vector; element 0 is the program.
    Argv(Vec<String>),
}

impl CommandLine {
    /// Short human-readable rendering for logs and status lines.
    pub fn display(&self) -> String {
        match self {
            CommandLine::Shell(line) => line.clone(),
            CommandLine::Argv(argv) => argv.join(" "),
        }
    }
}

/// Validated, immutable description of a process to supervise.
///
/// Construct via [`ProcessSpec::shell`] or [`ProcessSpec::argv`], then chain
/// `working_dir` / `env` and finish with [`ProcessSpecBuilder::build`]:
///
/// ```rust,no_run
/// use procwatch::proc::ProcessSpec;
///
/// let spec = ProcessSpec::argv(["cargo", "build"])
///     .working_dir("services/worker")
///     .env("RUST_LOG", "debug")
///     .build()?;
/// # Ok::<(), procwatch::errors::ProcwatchError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    command: CommandLine,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl ProcessSpec {
    /// Start building a spec from a shell command line.
    pub fn shell(line: impl Into<String>) -> ProcessSpecBuilder {
        ProcessSpecBuilder {
            command: CommandLine::Shell(line.into()),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    /// Start building a spec from an explicit argument vector.
    pub fn argv<I, S>(argv: I) -> ProcessSpecBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ProcessSpecBuilder {
            command: CommandLine::Argv(argv.into_iter().map(Into::into).collect()),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    /// Working directory, if one was configured; `None` means the caller's
    /// current working directory.
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Environment overrides merged over the inherited environment.
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// Build the `tokio::process::Command` for this spec.
    ///
    /// Both output pipes are captured; stdin is closed. `kill_on_drop` is a
    /// last-resort backstop only — orderly teardown goes through
    /// `ProcessHandle::stop`.
    pub(crate) fn to_command(&self) -> Command {
        let mut cmd = match &self.command {
            CommandLine::Shell(line) => {
                if cfg!(windows) {
                    let mut c = Command::new("cmd");
                    c.arg("/C").arg(line);
                    c
                } else {
                    let mut c = Command::new("sh");
                    c.arg("-c").arg(line);
                    c
                }
            }
            CommandLine::Argv(argv) => {
                let mut c = Command::new(&argv[0]);
                c.args(&argv[1..]);
                c
            }
        };

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        cmd
    }
}

/// Builder for [`ProcessSpec`]; validation happens in [`build`].
///
/// [`build`]: ProcessSpecBuilder::build
#[derive(Debug, Clone)]
pub struct ProcessSpecBuilder {
    command: CommandLine,
    working_dir: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl ProcessSpecBuilder {
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// Validate and freeze the spec.
    ///
    /// - the command must be non-empty (a blank shell line, an empty argv,
    ///   or a blank program are all rejected),
    /// - `working_dir`, if given, must name an existing directory.
    pub fn build(self) -> Result<ProcessSpec> {
        match &self.command {
            CommandLine::Shell(line) => {
                if line.trim().is_empty() {
                    return Err(ProcwatchError::ConfigError(
                        "command must not be empty".to_string(),
                    ));
                }
            }
            CommandLine::Argv(argv) => {
                if argv.is_empty() {
                    return Err(ProcwatchError::ConfigError(
                        "argv must contain at least the program name".to_string(),
                    ));
                }
                if argv[0].trim().is_empty() {
                    return Err(ProcwatchError::ConfigError(
                        "argv[0] (the program) must not be empty".to_string(),
                    ));
                }
            }
        }

        if let Some(dir) = &self.working_dir {
            if !dir.is_dir() {
                return Err(ProcwatchError::ConfigError(format!(
                    "working directory '{}' does not exist or is not a directory",
                    dir.display()
                )));
            }
        }

        Ok(ProcessSpec {
            command: self.command,
            working_dir: self.working_dir,
            env: self.env,
        })
    }
}
