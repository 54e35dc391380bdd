//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (GH_RELAY__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::access_control::Rule;
use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::net::Ipv4Addr;
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "gh-relay.toml",
    ".gh-relay.toml",
    "~/.config/gh-relay/config.toml",
    "/etc/gh-relay/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    load_or_init_config(config_path).map(|(config, _)| config)
}

/// Load configuration, reporting whether a default file was written
///
/// An explicit path that does not exist yet is created with the default
/// settings, so the operator has a file to edit on the next start. The
/// returned flag is true when that happened.
pub fn load_or_init_config(config_path: Option<&str>) -> Result<(AppConfig, bool), ConfigError> {
    let mut builder = Config::builder();
    let mut created = false;

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        if !Path::new(path).exists() {
            save_config(&AppConfig::default(), path)?;
            created = true;
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with GH_RELAY prefix
    // e.g., GH_RELAY__SERVER__PORT, GH_RELAY__PROXY__JSDELIVR
    // Double underscore (__) maps to nested keys (server.port)
    builder = builder.add_source(
        Environment::with_prefix("GH_RELAY")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok((app_config, created))
}

/// Persist configuration as TOML, creating parent directories as needed
pub fn save_config(config: &AppConfig, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let text =
        toml::to_string_pretty(config).map_err(|e| ConfigError::Serialize(e.to_string()))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_host(&config.server.host)?;

    if config.server.port == 0 {
        return Err(ConfigError::invalid("server.port must be between 1 and 65535"));
    }

    if config.proxy.chunk_size == 0 {
        return Err(ConfigError::invalid(
            "proxy.chunk_size must be greater than 0",
        ));
    }

    if config.proxy.size_limit == 0 {
        return Err(ConfigError::invalid(
            "proxy.size_limit must be greater than 0",
        ));
    }

    if config.proxy.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "proxy.timeout_secs must be greater than 0",
        ));
    }

    if let Some(proxy) = &config.proxy.upstream_proxy
        && !proxy.starts_with("http://")
        && !proxy.starts_with("https://")
    {
        return Err(ConfigError::invalid(format!(
            "proxy.upstream_proxy must start with http:// or https://, got: {}",
            proxy
        )));
    }

    validate_rules(&config.access_control.whitelist)?;
    validate_rules(&config.access_control.blacklist)?;
    validate_rules(&config.access_control.pass_list)?;

    Ok(())
}

/// Validate a listen host: an IPv4 literal or `localhost`
pub fn validate_host(host: &str) -> Result<(), ConfigError> {
    if host == "localhost" {
        return Ok(());
    }

    host.parse::<Ipv4Addr>().map(|_| ()).map_err(|_| {
        ConfigError::invalid(format!(
            "server.host must be an IPv4 address or 'localhost', got: {}",
            host
        ))
    })
}

fn validate_rules(rules: &[String]) -> Result<(), ConfigError> {
    for rule in rules {
        Rule::parse(rule)?;
    }
    Ok(())
}
