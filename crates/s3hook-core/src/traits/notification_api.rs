// # Bucket Notification API Trait
//
// Defines the interface to a storage bucket's event notification
// configuration (S3).
//
// Only queue destinations are exposed. Implementations must preserve any
// other kind of destination (topics, functions, event buses) when writing
// the queue list back.

use async_trait::async_trait;

/// A bucket notification delivering events to a queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNotification {
    /// Identifier of the notification within the bucket configuration
    pub id: String,
    /// ARN of the destination queue
    pub queue_arn: String,
    /// Event types delivered to the queue
    pub events: Vec<String>,
}

impl QueueNotification {
    /// Whether two notifications deliver the same events to the same queue
    pub fn same_target(&self, other: &QueueNotification) -> bool {
        let mut a = self.events.clone();
        let mut b = other.events.clone();
        a.sort();
        b.sort();
        self.id == other.id && self.queue_arn == other.queue_arn && a == b
    }
}

/// Trait for bucket notification configuration implementations
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait BucketNotificationApi: Send + Sync {
    /// Read the queue notifications configured on a bucket
    ///
    /// # Parameters
    ///
    /// - `bucket`: Bucket name
    /// - `expected_owner`: Account ID the bucket must belong to
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<QueueNotification>)`: Configured queue notifications
    /// - `Err(Error::NotFound)`: The bucket does not exist
    async fn queue_notifications(
        &self,
        bucket: &str,
        expected_owner: &str,
    ) -> Result<Vec<QueueNotification>, crate::Error>;

    /// Replace the queue notifications configured on a bucket
    ///
    /// # Parameters
    ///
    /// - `bucket`: Bucket name
    /// - `expected_owner`: Account ID the bucket must belong to
    /// - `notifications`: The complete list of queue notifications to set
    async fn put_queue_notifications(
        &self,
        bucket: &str,
        expected_owner: &str,
        notifications: &[QueueNotification],
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
