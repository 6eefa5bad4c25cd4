// # Memory Secret Store
//
// In-memory implementation of SecretStore, for tests and for deployments
// that rely exclusively on ambient credentials.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::source::SecretKeySelector;
use crate::traits::SecretStore;

/// Secrets keyed by `(namespace, name)`, each holding key/value data
type SecretMap = HashMap<(String, String), HashMap<String, String>>;

/// In-memory secret store implementation
///
/// # Example
///
/// ```rust,no_run
/// use s3hook_core::secrets::MemorySecretStore;
/// use s3hook_core::source::SecretKeySelector;
/// use s3hook_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemorySecretStore::new();
///     store.insert("default", "aws", "accessKeyID", "AKIA...").await;
///
///     let selector = SecretKeySelector { name: "aws".into(), key: "accessKeyID".into() };
///     let value = store.get("default", &selector).await?;
///     assert_eq!(value, "AKIA...");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    inner: Arc<RwLock<SecretMap>>,
}

impl MemorySecretStore {
    /// Create a new empty memory secret store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key of a secret, creating the secret if needed
    pub async fn insert(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        let mut guard = self.inner.write().await;
        guard
            .entry((namespace.into(), name.into()))
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Remove a whole secret
    pub async fn remove(&self, namespace: &str, name: &str) {
        let mut guard = self.inner.write().await;
        guard.remove(&(namespace.to_string(), name.to_string()));
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn get(&self, namespace: &str, selector: &SecretKeySelector) -> Result<String, Error> {
        let guard = self.inner.read().await;
        let secret = guard
            .get(&(namespace.to_string(), selector.name.clone()))
            .ok_or_else(|| {
                Error::secret_not_found(format!("{}/{}", namespace, selector.name))
            })?;

        secret.get(&selector.key).cloned().ok_or_else(|| {
            Error::secret_not_found(format!(
                "key {:?} in {}/{}",
                selector.key, namespace, selector.name
            ))
        })
    }
}
