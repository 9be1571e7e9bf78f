// src/config/model.rs

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{ProcwatchError, Result};
use crate::proc::{ProcessSpec, SuperviseOptions};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// poll_interval_ms = 50
/// wrap_columns = 80
///
/// [process.pinger]
/// cmd = "ping -c 10 localhost"
/// keep_stdout = true
///
/// [process.worker]
/// argv = ["cargo", "build", "--release"]
/// cwd = "services/worker"
/// env = { RUST_LOG = "debug" }
/// ```
///
/// All sections are optional except that at least one `[process.<id>]`
/// must be present; defaults are applied by `serde`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Collection-wide defaults from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All supervised processes from `[process.<id>]`.
    ///
    /// Keys are the process ids used as display labels. Note the map is
    /// ordered by id, so config-driven collections iterate in sorted-id
    /// order.
    #[serde(default)]
    pub process: BTreeMap<String, ProcessEntry>,
}

/// Validated configuration. Obtained via `TryFrom<RawConfigFile>`
/// (see `config::validate`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub process: BTreeMap<String, ProcessEntry>,
}

impl ConfigFile {
    /// Construct without re-validating. Only `validate.rs` should call
    /// this, after running the checks.
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        process: BTreeMap<String, ProcessEntry>,
    ) -> Self {
        Self { config, process }
    }

    /// Resolve every entry into a validated `(spec, options)` pair, in id
    /// order.
    pub fn supervised(&self) -> Result<Vec<(ProcessSpec, SuperviseOptions)>> {
        self.process
            .iter()
            .map(|(id, entry)| {
                let spec = entry.to_spec().map_err(|err| {
                    ProcwatchError::ConfigError(format!("process '{id}': {err}"))
                })?;
                Ok((spec, entry.to_options(id, &self.config)))
            })
            .collect()
    }
}

/// `[config]` section: collection-wide defaults, overridable per process.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Interval between poll ticks, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Wrap width for printed output lines.
    #[serde(default = "default_wrap_columns")]
    pub wrap_columns: usize,
}

fn default_poll_interval_ms() -> u64 {
    50
}

fn default_wrap_columns() -> usize {
    80
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            wrap_columns: default_wrap_columns(),
        }
    }
}

/// `[process.<id>]` section.
///
/// Exactly one of `cmd` / `argv` must be given: `cmd` is a shell command
/// line, `argv` an explicit argument vector for arguments that may contain
/// whitespace.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessEntry {
    /// Shell-style command line.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Explicit argument vector (element 0 is the program).
    #[serde(default)]
    pub argv: Option<Vec<String>>,

    /// Working directory; must exist. Defaults to the caller's cwd.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Environment overrides merged over the inherited environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default = "default_true")]
    pub print_stdout: bool,

    #[serde(default = "default_true")]
    pub print_stderr: bool,

    #[serde(default)]
    pub keep_stdout: bool,

    #[serde(default)]
    pub keep_stderr: bool,

    /// Per-process override of `[config].wrap_columns`.
    #[serde(default)]
    pub wrap_columns: Option<usize>,

    /// Per-process override of `[config].poll_interval_ms`.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl ProcessEntry {
    /// Build the validated `ProcessSpec` for this entry.
    pub fn to_spec(&self) -> Result<ProcessSpec> {
        let builder = match (&self.cmd, &self.argv) {
            (Some(cmd), None) => ProcessSpec::shell(cmd),
            (None, Some(argv)) => ProcessSpec::argv(argv.clone()),
            // validate.rs rejects these shapes up front; kept as a guard
            // for specs built without going through the loader.
            (Some(_), Some(_)) => {
                return Err(ProcwatchError::ConfigError(
                    "`cmd` and `argv` are mutually exclusive".to_string(),
                ));
            }
            (None, None) => {
                return Err(ProcwatchError::ConfigError(
                    "one of `cmd` or `argv` is required".to_string(),
                ));
            }
        };

        let builder = match &self.cwd {
            Some(cwd) => builder.working_dir(cwd),
            None => builder,
        };

        builder.envs(self.env.clone()).build()
    }

    /// Resolve supervision options for this entry against the `[config]`
    /// defaults.
    pub fn to_options(&self, id: &str, defaults: &ConfigSection) -> SuperviseOptions {
        SuperviseOptions::new()
            .id(id)
            .print_stdout(self.print_stdout)
            .print_stderr(self.print_stderr)
            .keep_stdout(self.keep_stdout)
            .keep_stderr(self.keep_stderr)
            .wrap_columns(self.wrap_columns.unwrap_or(defaults.wrap_columns))
            .poll_interval(Duration::from_millis(
                self.poll_interval_ms.unwrap_or(defaults.poll_interval_ms),
            ))
    }
}
