// src/config/validate.rs

use std::path::Path;

use crate::config::model::{ConfigFile, ProcessEntry, RawConfigFile};
use crate::errors::{ProcwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ProcwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.process))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_processes(cfg)?;
    validate_global_config(cfg)?;
    for (id, entry) in cfg.process.iter() {
        validate_process_entry(id, entry)?;
    }
    Ok(())
}

fn ensure_has_processes(cfg: &RawConfigFile) -> Result<()> {
    if cfg.process.is_empty() {
        return Err(ProcwatchError::ConfigError(
            "config must contain at least one [process.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.poll_interval_ms == 0 {
        return Err(ProcwatchError::ConfigError(
            "[config].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.wrap_columns == 0 {
        return Err(ProcwatchError::ConfigError(
            "[config].wrap_columns must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_process_entry(id: &str, entry: &ProcessEntry) -> Result<()> {
    match (&entry.cmd, &entry.argv) {
        (Some(_), Some(_)) => {
            return Err(ProcwatchError::ConfigError(format!(
                "process '{id}' sets both `cmd` and `argv`; they are mutually exclusive"
            )));
        }
        (None, None) => {
            return Err(ProcwatchError::ConfigError(format!(
                "process '{id}' needs one of `cmd` or `argv`"
            )));
        }
        (Some(cmd), None) => {
            if cmd.trim().is_empty() {
                return Err(ProcwatchError::ConfigError(format!(
                    "process '{id}' has an empty `cmd`"
                )));
            }
        }
        (None, Some(argv)) => {
            if argv.is_empty() || argv[0].trim().is_empty() {
                return Err(ProcwatchError::ConfigError(format!(
                    "process '{id}' has an empty `argv`"
                )));
            }
        }
    }

    if let Some(cwd) = &entry.cwd {
        if !Path::new(cwd).is_dir() {
            return Err(ProcwatchError::ConfigError(format!(
                "process '{id}': working directory '{cwd}' does not exist"
            )));
        }
    }

    if let Some(0) = entry.poll_interval_ms {
        return Err(ProcwatchError::ConfigError(format!(
            "process '{id}': poll_interval_ms must be >= 1 (got 0)"
        )));
    }
    if let Some(0) = entry.wrap_columns {
        return Err(ProcwatchError::ConfigError(format!(
            "process '{id}': wrap_columns must be >= 1 (got 0)"
        )));
    }

    Ok(())
}
