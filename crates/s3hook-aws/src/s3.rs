//! Amazon S3 implementation of `BucketNotificationApi`
//!
//! S3 only offers a read and a full overwrite of a bucket's notification
//! configuration. Writing the queue list back therefore re-reads the full
//! configuration and carries over its topic, function and EventBridge
//! destinations, as well as the filters of queue notifications that did
//! not change.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::types::{Event, NotificationConfiguration, QueueConfiguration};
use s3hook_core::traits::{BucketNotificationApi, QueueNotification};
use s3hook_core::{Error, Result};
use tracing::debug;

use crate::errors::from_sdk_error;

const PROVIDER: &str = "s3";

/// S3 bucket notification API
#[derive(Debug, Clone)]
pub struct S3NotificationApi {
    client: Client,
}

impl S3NotificationApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn to_notification(config: &QueueConfiguration) -> QueueNotification {
    QueueNotification {
        id: config.id().unwrap_or_default().to_string(),
        queue_arn: config.queue_arn().to_string(),
        events: config.events().iter().map(|e| e.as_str().to_string()).collect(),
    }
}

/// Build the queue configurations to write, reusing existing entries that
/// are unchanged so that their filters are preserved.
fn merge_queue_configurations(
    existing: &[QueueConfiguration],
    desired: &[QueueNotification],
) -> Result<Vec<QueueConfiguration>> {
    desired
        .iter()
        .map(|notification| {
            let unchanged = existing
                .iter()
                .find(|config| to_notification(config).same_target(notification));

            match unchanged {
                Some(config) => Ok(config.clone()),
                None => QueueConfiguration::builder()
                    .id(&notification.id)
                    .queue_arn(&notification.queue_arn)
                    .set_events(Some(
                        notification
                            .events
                            .iter()
                            .map(|e| Event::from(e.as_str()))
                            .collect(),
                    ))
                    .build()
                    .map_err(|e| {
                        Error::invalid_input(format!(
                            "invalid queue notification {:?}: {}",
                            notification.id, e
                        ))
                    }),
            }
        })
        .collect()
}

#[async_trait]
impl BucketNotificationApi for S3NotificationApi {
    async fn queue_notifications(
        &self,
        bucket: &str,
        expected_owner: &str,
    ) -> Result<Vec<QueueNotification>> {
        let out = self
            .client
            .get_bucket_notification_configuration()
            .bucket(bucket)
            .expected_bucket_owner(expected_owner)
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "GetBucketNotificationConfiguration", e))?;

        Ok(out.queue_configurations().iter().map(to_notification).collect())
    }

    async fn put_queue_notifications(
        &self,
        bucket: &str,
        expected_owner: &str,
        notifications: &[QueueNotification],
    ) -> Result<()> {
        let current = self
            .client
            .get_bucket_notification_configuration()
            .bucket(bucket)
            .expected_bucket_owner(expected_owner)
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "GetBucketNotificationConfiguration", e))?;

        let queues = merge_queue_configurations(current.queue_configurations(), notifications)?;

        let config = NotificationConfiguration::builder()
            .set_queue_configurations(Some(queues))
            .set_topic_configurations(Some(current.topic_configurations().to_vec()))
            .set_lambda_function_configurations(Some(
                current.lambda_function_configurations().to_vec(),
            ))
            .set_event_bridge_configuration(current.event_bridge_configuration().cloned())
            .build();

        debug!(bucket, queue_notifications = notifications.len(), "Writing bucket notification configuration");

        self.client
            .put_bucket_notification_configuration()
            .bucket(bucket)
            .expected_bucket_owner(expected_owner)
            .notification_configuration(config)
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "PutBucketNotificationConfiguration", e))?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
