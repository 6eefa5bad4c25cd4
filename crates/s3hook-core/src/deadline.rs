//! Per-call deadlines for provider clients
//!
//! Wraps provider clients so that every API round trip is bounded by
//! `tokio::time::timeout`. An expired call fails with `Error::Timeout` and
//! is not retried. Dropping the returned future cancels the call.

use async_trait::async_trait;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::traits::{BucketNotificationApi, Clients, QueueApi, QueueAttribute, QueueNotification};

/// Run a provider call with a deadline
pub async fn with_deadline<T, F>(timeout: Duration, operation: &str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(format!("{} after {:?}", operation, timeout))),
    }
}

impl Clients {
    /// Bound every call made through these clients by `timeout`
    pub fn with_deadline(self, timeout: Duration) -> Clients {
        Clients {
            queues: Arc::new(DeadlineQueueApi {
                inner: self.queues,
                timeout,
            }),
            notifications: Arc::new(DeadlineNotificationApi {
                inner: self.notifications,
                timeout,
            }),
        }
    }
}

struct DeadlineQueueApi {
    inner: Arc<dyn QueueApi>,
    timeout: Duration,
}

#[async_trait]
impl QueueApi for DeadlineQueueApi {
    async fn queue_url(&self, queue_name: &str) -> Result<String> {
        with_deadline(self.timeout, "GetQueueUrl", self.inner.queue_url(queue_name)).await
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        tags: &HashMap<String, String>,
    ) -> Result<String> {
        with_deadline(
            self.timeout,
            "CreateQueue",
            self.inner.create_queue(queue_name, tags),
        )
        .await
    }

    async fn queue_attributes(
        &self,
        queue_url: &str,
        attributes: &[QueueAttribute],
    ) -> Result<HashMap<QueueAttribute, String>> {
        with_deadline(
            self.timeout,
            "GetQueueAttributes",
            self.inner.queue_attributes(queue_url, attributes),
        )
        .await
    }

    async fn set_queue_policy(&self, queue_url: &str, policy: &Policy) -> Result<()> {
        with_deadline(
            self.timeout,
            "SetQueueAttributes",
            self.inner.set_queue_policy(queue_url, policy),
        )
        .await
    }

    async fn queue_tags(&self, queue_url: &str) -> Result<HashMap<String, String>> {
        with_deadline(self.timeout, "ListQueueTags", self.inner.queue_tags(queue_url)).await
    }

    async fn delete_queue(&self, queue_url: &str) -> Result<()> {
        with_deadline(self.timeout, "DeleteQueue", self.inner.delete_queue(queue_url)).await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

struct DeadlineNotificationApi {
    inner: Arc<dyn BucketNotificationApi>,
    timeout: Duration,
}

#[async_trait]
impl BucketNotificationApi for DeadlineNotificationApi {
    async fn queue_notifications(
        &self,
        bucket: &str,
        expected_owner: &str,
    ) -> Result<Vec<QueueNotification>> {
        with_deadline(
            self.timeout,
            "GetBucketNotificationConfiguration",
            self.inner.queue_notifications(bucket, expected_owner),
        )
        .await
    }

    async fn put_queue_notifications(
        &self,
        bucket: &str,
        expected_owner: &str,
        notifications: &[QueueNotification],
    ) -> Result<()> {
        with_deadline(
            self.timeout,
            "PutBucketNotificationConfiguration",
            self.inner
                .put_queue_notifications(bucket, expected_owner, notifications),
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
