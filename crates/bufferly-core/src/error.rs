//! Core error types for bufferly-core.
//!
//! This module defines a comprehensive error hierarchy using thiserror
//! for better error handling and reporting across the library.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bufferly-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors (fatal at load time)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Calendar adapter errors
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// OAuth-related errors
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// A pattern list entry failed to compile
    #[error("Invalid pattern in '{key}' ({pattern}): {message}")]
    InvalidPattern {
        key: String,
        pattern: String,
        message: String,
    },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors from the external calendar store.
///
/// Reported per-operation: a failed create or delete never aborts the
/// overall pass, the engine records it and continues to the next item.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The calendar API returned an error payload
    #[error("Calendar API error: {0}")]
    Api(String),

    /// HTTP transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    /// Not authenticated with the backing service
    #[error("Not authenticated with {service}")]
    NotAuthenticated { service: String },

    /// Caller identity could not be resolved
    #[error("Could not resolve calendar identity: {0}")]
    IdentityUnresolved(String),
}

/// OAuth-specific errors.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// Authorization failed
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Token exchange failed
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Token refresh failed
    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// Access token expired
    #[error("Access token expired and no refresh token available")]
    TokenExpired,

    /// Credentials not configured
    #[error("OAuth credentials not configured for {service}")]
    CredentialsNotConfigured { service: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid time range
    #[error("Invalid time range: end ({end}) must be greater than start ({start})")]
    InvalidTimeRange {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
