// # File Secret Store
//
// Read-only SecretStore backed by a JSON file, typically a mounted volume.
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "secrets": {
//     "default/aws-credentials": {
//       "accessKeyID": "AKIA...",
//       "secretAccessKey": "..."
//     }
//   }
// }
// ```
//
// Secrets are keyed by `<namespace>/<name>`. The file is read once on
// creation; `reload()` picks up rotated credentials.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

use crate::Error;
use crate::source::SecretKeySelector;
use crate::traits::SecretStore;

/// Secret file format version
const SECRET_FILE_VERSION: &str = "1.0";

/// Serializable secret file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct SecretFileFormat {
    version: String,
    #[serde(default)]
    secrets: HashMap<String, HashMap<String, String>>,
}

/// File-based secret store
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
    secrets: Arc<RwLock<HashMap<String, HashMap<String, String>>>>,
}

impl FileSecretStore {
    /// Load a secret store from a file
    ///
    /// A missing file is a configuration error: unlike a missing secret,
    /// it affects every source at once.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let secrets = Self::load(&path).await?;

        Ok(Self {
            path,
            secrets: Arc::new(RwLock::new(secrets)),
        })
    }

    /// Re-read the secret file
    pub async fn reload(&self) -> Result<(), Error> {
        let secrets = Self::load(&self.path).await?;
        *self.secrets.write().await = secrets;
        Ok(())
    }

    async fn load(path: &Path) -> Result<HashMap<String, HashMap<String, String>>, Error> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read secret file {}: {}",
                path.display(),
                e
            ))
        })?;

        let file: SecretFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse secret file {}: {}",
                path.display(),
                e
            ))
        })?;

        if file.version != SECRET_FILE_VERSION {
            tracing::warn!(
                "Secret file version mismatch: expected {}, got {}. \
                Attempting to load anyway.",
                SECRET_FILE_VERSION,
                file.version
            );
        }

        tracing::debug!("Loaded {} secret(s) from {}", file.secrets.len(), path.display());
        Ok(file.secrets)
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get(&self, namespace: &str, selector: &SecretKeySelector) -> Result<String, Error> {
        let id = format!("{}/{}", namespace, selector.name);
        let guard = self.secrets.read().await;

        guard
            .get(&id)
            .and_then(|secret| secret.get(&selector.key))
            .cloned()
            .ok_or_else(|| Error::secret_not_found(format!("key {:?} in {}", selector.key, id)))
    }
}
