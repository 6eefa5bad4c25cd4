// # Queue API Trait
//
// Defines the interface to the message queue service (SQS).
//
// ## Implementations
//
// - AWS SQS: `s3hook-aws` crate
// - In-memory doubles: `tests/common`
//
// ## Error Classes
//
// Implementations map provider errors onto the crate error taxonomy:
//
// - Missing queue → `Error::NotFound`
// - Authorization failure → `Error::Denied`
// - Any other API error → `Error::Provider`

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

use crate::policy::Policy;

/// Queue attributes read by the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueAttribute {
    /// The queue's ARN
    QueueArn,
    /// The queue's access policy document
    Policy,
}

impl QueueAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueAttribute::QueueArn => "QueueArn",
            QueueAttribute::Policy => "Policy",
        }
    }
}

impl fmt::Display for QueueAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for message queue service implementations
///
/// Each method performs a single API round trip. Implementations must not
/// retry internally: the reconciler is re-invoked by its caller, and every
/// step it performs is idempotent.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// Resolve the URL of a queue by name
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The queue URL
    /// - `Err(Error::NotFound)`: No queue has this name
    /// - `Err(Error)`: The request failed or was rejected
    async fn queue_url(&self, queue_name: &str) -> Result<String, crate::Error>;

    /// Create a queue with the given tags
    ///
    /// Queue names are unique per account and region, so creating a queue
    /// that already exists with identical attributes returns its URL.
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The URL of the created queue
    async fn create_queue(
        &self,
        queue_name: &str,
        tags: &HashMap<String, String>,
    ) -> Result<String, crate::Error>;

    /// Read attributes of a queue in a single request
    ///
    /// Attributes the queue does not have (e.g. no policy set yet) are
    /// absent from the returned map.
    async fn queue_attributes(
        &self,
        queue_url: &str,
        attributes: &[QueueAttribute],
    ) -> Result<HashMap<QueueAttribute, String>, crate::Error>;

    /// Overwrite the access policy of a queue
    async fn set_queue_policy(&self, queue_url: &str, policy: &Policy)
    -> Result<(), crate::Error>;

    /// List the tags of a queue
    async fn queue_tags(&self, queue_url: &str) -> Result<HashMap<String, String>, crate::Error>;

    /// Delete a queue
    async fn delete_queue(&self, queue_url: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
