//! Configuration for Conduit.
//!
//! Provides TOML-based configuration with:
//! - Registry validation mode (`[registry]`)
//! - Log level, format and optional rolling log files (`[logging]`)
//! - Per-integration switches and the in-memory commerce backend data
//!   (`[integrations.platform]`, `[integrations.commerce]`)
//! - Config file layering (user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    ConfigSource, LoadedConfig, load_config, load_config_file, load_config_with_options,
    save_config, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
