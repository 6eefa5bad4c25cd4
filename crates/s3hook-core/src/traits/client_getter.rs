// # Client Getter Trait
//
// Obtains provider API clients configured for a given source: credentials
// come from the source's auth settings, the region from its bucket ARN.

use async_trait::async_trait;
use std::sync::Arc;

use crate::source::S3Source;
use crate::traits::{BucketNotificationApi, QueueApi};

/// Provider clients for one source
#[derive(Clone)]
pub struct Clients {
    /// Queue service client
    pub queues: Arc<dyn QueueApi>,
    /// Bucket notification client
    pub notifications: Arc<dyn BucketNotificationApi>,
}

/// Trait for obtaining provider clients
#[async_trait]
pub trait ClientGetter: Send + Sync {
    /// Get clients for interacting with the queue and bucket APIs
    ///
    /// # Returns
    ///
    /// - `Ok(Clients)`: Clients ready for use
    /// - `Err(Error::SecretNotFound)`: A secret referenced by the source is missing
    /// - `Err(Error)`: Clients could not be constructed
    async fn get(&self, source: &S3Source) -> Result<Clients, crate::Error>;
}
