//! Configuration module
//!
//! Handles loading, validating and persisting configuration from TOML files
//! and environment variables. The loaded [`AppConfig`] is an immutable
//! snapshot for the lifetime of the process.

pub mod loader;
pub mod types;

pub use loader::{
    load_config, load_config_from_str, load_or_init_config, save_config, validate_config,
    validate_host,
};
pub use types::*;
