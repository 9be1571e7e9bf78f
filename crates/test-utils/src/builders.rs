#![allow(dead_code)]

use std::collections::BTreeMap;

use procwatch::config::{ConfigFile, ConfigSection, ProcessEntry, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                process: BTreeMap::new(),
            },
        }
    }

    pub fn with_process(mut self, id: &str, entry: ProcessEntry) -> Self {
        self.config.process.insert(id.to_string(), entry);
        self
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.config.poll_interval_ms = ms;
        self
    }

    pub fn with_wrap_columns(mut self, columns: usize) -> Self {
        self.config.config.wrap_columns = columns;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProcessEntry`.
pub struct ProcessEntryBuilder {
    entry: ProcessEntry,
}

impl ProcessEntryBuilder {
    /// Entry running a shell command line.
    pub fn shell(cmd: &str) -> Self {
        Self {
            entry: ProcessEntry {
                cmd: Some(cmd.to_string()),
                argv: None,
                cwd: None,
                env: BTreeMap::new(),
                print_stdout: true,
                print_stderr: true,
                keep_stdout: false,
                keep_stderr: false,
                wrap_columns: None,
                poll_interval_ms: None,
            },
        }
    }

    /// Entry running an explicit argument vector.
    pub fn argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entry: ProcessEntry {
                cmd: None,
                argv: Some(argv.into_iter().map(Into::into).collect()),
                cwd: None,
                env: BTreeMap::new(),
                print_stdout: true,
                print_stderr: true,
                keep_stdout: false,
                keep_stderr: false,
                wrap_columns: None,
                poll_interval_ms: None,
            },
        }
    }

    pub fn cwd(mut self, dir: &str) -> Self {
        self.entry.cwd = Some(dir.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.entry.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn print_stdout(mut self, val: bool) -> Self {
        self.entry.print_stdout = val;
        self
    }

    pub fn print_stderr(mut self, val: bool) -> Self {
        self.entry.print_stderr = val;
        self
    }

    pub fn keep_stdout(mut self, val: bool) -> Self {
        self.entry.keep_stdout = val;
        self
    }

    pub fn keep_stderr(mut self, val: bool) -> Self {
        self.entry.keep_stderr = val;
        self
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.entry.poll_interval_ms = Some(ms);
        self
    }

    pub fn build(self) -> ProcessEntry {
        self.entry
    }
}
