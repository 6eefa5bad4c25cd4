// # Secret Store Trait
//
// Resolves the secret references declared in source specs.
//
// ## Implementations
//
// - In-memory: `secrets::MemorySecretStore`
// - JSON file: `secrets::FileSecretStore`

use async_trait::async_trait;

use crate::source::SecretKeySelector;

/// Trait for secret store implementations
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Get the value of a secret key
    ///
    /// # Parameters
    ///
    /// - `namespace`: Namespace of the referencing source
    /// - `selector`: Secret name and key
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The secret value
    /// - `Err(Error::SecretNotFound)`: The secret or key does not exist
    async fn get(&self, namespace: &str, selector: &SecretKeySelector)
    -> Result<String, crate::Error>;
}
