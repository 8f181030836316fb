//! Error types for scanguard
//!
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! Nothing in this crate aborts the surrounding scan: login and decode
//! failures are typed so callers can distinguish "credential unavailable"
//! from an internal fault, and the guard degrades the affected request
//! instead of propagating.

use thiserror::Error;

/// The main error type for scanguard
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Login failed with status {status}: {body}")]
    LoginFailed { status: u16, body: String },

    #[error("Login rejected by endpoint: {message}")]
    LoginRejected { message: String },

    #[error("Login response carried no token")]
    TokenMissing,

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Value not representable as {header} header")]
    InvalidHeader { header: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a login failure error
    pub fn login_failed(status: u16, body: impl Into<String>) -> Self {
        Self::LoginFailed {
            status,
            body: body.into(),
        }
    }

    /// Create a login rejection error
    pub fn login_rejected(message: impl Into<String>) -> Self {
        Self::LoginRejected {
            message: message.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(header: impl Into<String>) -> Self {
        Self::InvalidHeader {
            header: header.into(),
        }
    }

    /// Check if this is a transient authentication failure: the affected
    /// request proceeds without a fresh credential and login is retried
    /// on the next eligible request.
    pub fn is_transient_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::Http(_)
                | Error::LoginFailed { .. }
                | Error::LoginRejected { .. }
                | Error::TokenMissing
                | Error::JsonParse(_)
        )
    }
}

/// Result type alias for scanguard
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
