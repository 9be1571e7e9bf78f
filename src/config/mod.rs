// src/config/mod.rs

//! Declarative `Procwatch.toml` surface: `[config]` defaults plus one
//! `[process.<id>]` section per supervised process.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{ConfigFile, ConfigSection, ProcessEntry, RawConfigFile};
