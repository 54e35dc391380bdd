//! Configuration types for gh-relay
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Default upstream chunk size (10 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 10;

/// Default size ceiling (999 GiB)
pub const DEFAULT_SIZE_LIMIT: u64 = 1024 * 1024 * 1024 * 999;

/// Default ceiling for request bodies kept in memory for redirect replay (1 MiB)
pub const DEFAULT_MAX_REPLAY_BODY: usize = 1024 * 1024;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Listener settings
    pub server: ServerConfig,

    /// Upstream forwarding settings
    pub proxy: ProxyConfig,

    /// White/black/pass rule lists
    pub access_control: AccessControlConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IPv4 literal or `localhost`
    pub host: String,

    /// TCP port (1-65535)
    pub port: u16,

    /// Debug mode raises the default log level to `debug`
    #[serde(deserialize_with = "deserialize_toggle")]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
        }
    }
}

/// Upstream forwarding configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Size of each body chunk relayed to the client, in bytes
    pub chunk_size: usize,

    /// Responses declaring a larger Content-Length are redirected instead of streamed
    pub size_limit: u64,

    /// Redirect blob and raw-host files to the jsDelivr CDN mirror
    #[serde(deserialize_with = "deserialize_toggle")]
    pub jsdelivr: bool,

    /// Maximum number of upstream redirects resolved by the gateway per request
    pub max_redirects: u32,

    /// Connect and read-idle timeout for upstream requests, in seconds
    pub timeout_secs: u64,

    /// Request bodies up to this size are buffered so followed redirects can
    /// resend them; larger or unsized bodies are streamed upstream once
    pub max_replay_body: usize,

    /// Outbound HTTP proxy for upstream requests (e.g. `http://10.0.0.1:3128`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_proxy: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            size_limit: DEFAULT_SIZE_LIMIT,
            jsdelivr: false,
            max_redirects: 5,
            timeout_secs: 60,
            max_replay_body: DEFAULT_MAX_REPLAY_BODY,
            upstream_proxy: None,
        }
    }
}

/// Access control configuration
///
/// Each entry is `user`, `user/repo` or `*/repo`. Lists are evaluated in the
/// order whitelist, blacklist, pass list: a non-empty whitelist must match,
/// a blacklist hit denies, and a pass-list hit redirects the client straight
/// to the upstream or its CDN mirror.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessControlConfig {
    /// Only these entries are served when non-empty
    pub whitelist: Vec<String>,

    /// Entries denied outright
    pub blacklist: Vec<String>,

    /// Entries redirected instead of proxied
    pub pass_list: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

/// Accept `true`/`false`, `0`/`1` and their string spellings for on/off settings.
fn deserialize_toggle<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Toggle {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Toggle::deserialize(deserializer)? {
        Toggle::Bool(value) => Ok(value),
        Toggle::Int(0) => Ok(false),
        Toggle::Int(1) => Ok(true),
        Toggle::Int(other) => Err(de::Error::custom(format!(
            "expected 0 or 1, got {}",
            other
        ))),
        Toggle::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(de::Error::custom(format!(
                "expected a boolean toggle, got '{}'",
                other
            ))),
        },
    }
}
