//! Error types for gh-relay
//!
//! This module defines the error hierarchy used throughout the gateway.
//! We use `thiserror` for library-style errors that are part of the API,
//! and convert to HTTP responses at the request boundary.
//!
//! Classification failures and access denials are not errors here: they are
//! planner outcomes answered with 403. Oversized content is a redirect.

use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Forwarding error: {0}")]
    Forward(#[from] ForwardError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Invalid access rule '{rule}': {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn invalid_rule(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }
}

/// Upstream forwarding errors
///
/// Every variant is answered with HTTP 500 and is never retried.
#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("too many upstream redirects (limit {limit})")]
    TooManyRedirects { limit: u32 },

    #[error("invalid upstream location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("failed to read request body: {0}")]
    RequestBody(String),
}

impl ForwardError {
    pub fn invalid_location(location: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidLocation {
            location: location.into(),
            reason: reason.to_string(),
        }
    }
}

/// HTTP server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for forwarding operations
pub type ForwardResult<T> = std::result::Result<T, ForwardError>;
