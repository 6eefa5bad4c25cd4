// # Secret Store Implementations
//
// This module provides implementations of the SecretStore trait and the
// helpers that turn a source's auth settings into concrete values.

pub mod file;
pub mod memory;

pub use file::FileSecretStore;
pub use memory::MemorySecretStore;

use std::sync::Arc;

use crate::config::SecretStoreConfig;
use crate::error::{Error, Result};
use crate::source::ValueFromField;
use crate::traits::SecretStore;

/// Resolve a value given literally or by secret reference
///
/// # Parameters
///
/// - `store`: Store used to resolve secret references
/// - `namespace`: Namespace of the source declaring the value
/// - `field`: The value or reference
pub async fn resolve_value(
    store: &dyn SecretStore,
    namespace: &str,
    field: &ValueFromField,
) -> Result<String> {
    if let Some(value) = &field.value {
        return Ok(value.clone());
    }

    match &field.value_from_secret {
        Some(selector) => store.get(namespace, selector).await,
        None => Err(Error::invalid_input(
            "value must be given either literally or as a secret reference",
        )),
    }
}

/// Create the secret store selected in the configuration
pub async fn from_config(config: &SecretStoreConfig) -> Result<Arc<dyn SecretStore>> {
    match config {
        SecretStoreConfig::Memory => Ok(Arc::new(MemorySecretStore::new())),
        SecretStoreConfig::File { path } => Ok(Arc::new(FileSecretStore::new(path).await?)),
    }
}
