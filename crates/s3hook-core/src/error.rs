//! Error types for the S3 subscription hook
//!
//! This module defines all error types used throughout the crate.
//!
//! The variants follow the provider error taxonomy the reconciler reasons
//! about: `NotFound` and `Denied` are often valid outcomes during teardown,
//! while `Provider` and `Timeout` are always fatal for the current call.

use thiserror::Error;

/// Result type alias for hook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the S3 subscription hook
#[derive(Error, Debug)]
pub enum Error {
    /// The addressed provider resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The provider rejected the request for authorization reasons
    #[error("Access denied: {0}")]
    Denied(String),

    /// Any other error returned by a provider API (malformed request,
    /// throttling, unknown API error)
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A provider call did not complete within its deadline
    #[error("Provider call timed out: {0}")]
    Timeout(String),

    /// Provider API clients could not be constructed
    #[error("Cannot construct API clients: {0}")]
    ClientConstruction(String),

    /// A secret referenced by a source does not exist
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    /// Malformed ARN string
    #[error("Invalid ARN: {0}")]
    InvalidArn(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an access denied error
    pub fn denied(msg: impl Into<String>) -> Self {
        Self::Denied(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a client construction error
    pub fn client_construction(msg: impl Into<String>) -> Self {
        Self::ClientConstruction(msg.into())
    }

    /// Create a "secret not found" error
    pub fn secret_not_found(msg: impl Into<String>) -> Self {
        Self::SecretNotFound(msg.into())
    }

    /// Create an invalid ARN error
    pub fn invalid_arn(msg: impl Into<String>) -> Self {
        Self::InvalidArn(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Prefix the error message with context, keeping the variant
    ///
    /// `Json` and `Io` carry their source error and are returned unchanged.
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        let wrap = |msg: String| format!("{}: {}", context, msg);
        match self {
            Self::NotFound(msg) => Self::NotFound(wrap(msg)),
            Self::Denied(msg) => Self::Denied(wrap(msg)),
            Self::Provider { provider, message } => Self::Provider {
                provider,
                message: wrap(message),
            },
            Self::Timeout(msg) => Self::Timeout(wrap(msg)),
            Self::ClientConstruction(msg) => Self::ClientConstruction(wrap(msg)),
            Self::SecretNotFound(msg) => Self::SecretNotFound(wrap(msg)),
            Self::InvalidArn(msg) => Self::InvalidArn(wrap(msg)),
            Self::InvalidInput(msg) => Self::InvalidInput(wrap(msg)),
            Self::Config(msg) => Self::Config(wrap(msg)),
            Self::Other(msg) => Self::Other(wrap(msg)),
            err @ (Self::Json(_) | Self::Io(_)) => err,
        }
    }

    /// Whether the error reports a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the error reports an authorization failure
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied(_))
    }

    /// Whether the error is an explicit rejection by the provider API, as
    /// opposed to a transport failure or timeout.
    pub fn is_api_rejection(&self) -> bool {
        matches!(self, Self::Denied(_) | Self::Provider { .. })
    }

    /// Whether the error reports a missing secret
    pub fn is_secret_not_found(&self) -> bool {
        matches!(self, Self::SecretNotFound(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
