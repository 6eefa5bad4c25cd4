//! Bucket event notification configuration
//!
//! Each source owns at most one queue notification in its bucket's
//! configuration, identified by the source's ID. Notifications with other
//! IDs belong to other sources or to the user and are always preserved.

use tracing::{debug, info};

use crate::arn::Arn;
use crate::error::Result;
use crate::source::S3Source;
use crate::traits::{BucketNotificationApi, QueueNotification};

/// Outcome of enabling notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationsEnabled {
    /// The bucket already delivered the desired events to the queue
    Unchanged,
    /// The bucket configuration was written
    Updated,
}

/// Outcome of disabling notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationsDisabled {
    /// The source's notification was removed from the bucket
    Removed,
    /// The bucket had no notification for the source
    Absent,
    /// The bucket no longer exists
    BucketGone,
}

/// The notification the source wants configured on its bucket
pub fn desired_notification(src: &S3Source, queue_arn: &Arn) -> QueueNotification {
    QueueNotification {
        id: src.source_id(),
        queue_arn: queue_arn.to_string(),
        events: src.spec.event_types.clone(),
    }
}

/// Ensure the source's bucket sends event notifications to the queue with
/// the given ARN.
///
/// Safe to call on every reconcile: the bucket configuration is only
/// written when it differs from the desired one.
pub async fn ensure_notifications_enabled(
    src: &S3Source,
    queue_arn: &Arn,
    cli: &dyn BucketNotificationApi,
) -> Result<NotificationsEnabled> {
    let bucket = src.bucket_name();
    let owner = &src.spec.arn.account_id;
    let desired = desired_notification(src, queue_arn);

    let mut current = cli
        .queue_notifications(bucket, owner)
        .await
        .map_err(|e| e.context("getting bucket notification configuration"))?;

    match current.iter_mut().find(|n| n.id == desired.id) {
        Some(existing) if existing.same_target(&desired) => {
            debug!(bucket, "Bucket notifications are up to date");
            return Ok(NotificationsEnabled::Unchanged);
        }
        Some(existing) => *existing = desired,
        None => current.push(desired),
    }

    cli.put_queue_notifications(bucket, owner, &current)
        .await
        .map_err(|e| e.context("setting bucket notification configuration"))?;

    info!(bucket, queue_arn = %queue_arn, "Enabled bucket notifications");
    Ok(NotificationsEnabled::Updated)
}

/// Ensure the source's bucket no longer sends event notifications on its
/// behalf.
pub async fn ensure_notifications_disabled(
    src: &S3Source,
    cli: &dyn BucketNotificationApi,
) -> Result<NotificationsDisabled> {
    let bucket = src.bucket_name();
    let owner = &src.spec.arn.account_id;
    let id = src.source_id();

    let mut current = match cli.queue_notifications(bucket, owner).await {
        Ok(notifications) => notifications,
        Err(e) if e.is_not_found() => {
            debug!(bucket, "Bucket not found, skipping notifications cleanup");
            return Ok(NotificationsDisabled::BucketGone);
        }
        Err(e) => return Err(e.context("getting bucket notification configuration")),
    };

    let before = current.len();
    current.retain(|n| n.id != id);
    if current.len() == before {
        return Ok(NotificationsDisabled::Absent);
    }

    match cli.put_queue_notifications(bucket, owner, &current).await {
        Ok(()) => {
            info!(bucket, "Disabled bucket notifications");
            Ok(NotificationsDisabled::Removed)
        }
        Err(e) if e.is_not_found() => Ok(NotificationsDisabled::BucketGone),
        Err(e) => Err(e.context("setting bucket notification configuration")),
    }
}
