//! Configuration types for the S3 subscription hook
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main hook configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookConfig {
    /// Reconciler settings
    #[serde(default)]
    pub reconciler: ReconcilerConfig,

    /// Secret store used to resolve source credentials
    #[serde(default)]
    pub secret_store: SecretStoreConfig,

    /// AWS provider settings
    #[serde(default)]
    pub aws: AwsProviderConfig,
}

impl HookConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.reconciler.validate()?;
        self.secret_store.validate()?;
        self.aws.validate()?;
        Ok(())
    }
}

/// Reconciler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Deadline of a single provider API call (in seconds)
    ///
    /// A call exceeding it fails with `Error::Timeout` and is not retried.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Capacity of the subscription event channel
    ///
    /// When full, new events are dropped (with a warning log).
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl ReconcilerConfig {
    /// Validate the reconciler configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.call_timeout_secs == 0 {
            return Err(crate::Error::config("Provider call timeout must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// Provider call deadline as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    100
}

/// Secret store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SecretStoreConfig {
    /// JSON file holding secrets keyed by `<namespace>/<name>`
    File {
        /// Path to the secret file
        path: String,
    },

    /// In-memory secret store (empty unless populated programmatically)
    #[default]
    Memory,
}

impl SecretStoreConfig {
    /// Validate the secret store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            SecretStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("Secret file path cannot be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            SecretStoreConfig::File { .. } => "file",
            SecretStoreConfig::Memory => "memory",
        }
    }
}

/// AWS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsProviderConfig {
    /// Endpoint override for both SQS and S3 (e.g. LocalStack)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// SDK operation timeout, including SDK-internal attempts (in seconds)
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
}

impl AwsProviderConfig {
    /// Validate the AWS provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if let Some(url) = &self.endpoint_url {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(crate::Error::config(format!(
                    "AWS endpoint URL must use HTTP or HTTPS scheme. Got: {}",
                    url
                )));
            }
        }
        if self.operation_timeout_secs == 0 {
            return Err(crate::Error::config("AWS operation timeout must be > 0"));
        }
        Ok(())
    }

    /// SDK operation timeout as a Duration
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl Default for AwsProviderConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            operation_timeout_secs: default_operation_timeout_secs(),
        }
    }
}

fn default_operation_timeout_secs() -> u64 {
    25
}
