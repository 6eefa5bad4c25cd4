//! Queue lifecycle management
//!
//! Ensures the existence (or absence) of the queue receiving a bucket's
//! event notifications.
//!
//! ## Ownership
//!
//! Queues created here are tagged with `owned-by = <source id>`. That tag is
//! the only authority for deleting a queue: a queue with a matching name but
//! a missing or foreign tag is left untouched. Queues supplied by the user
//! in the source's destination are never created, modified or deleted.

pub mod policy;

pub use policy::{PolicySync, make_queue_policy, sync_queue_policy};

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::arn::Arn;
use crate::error::{Error, Result};
use crate::source::S3Source;
use crate::traits::{QueueApi, QueueAttribute};

/// Tag recording the ARN of the bucket a queue receives events from
pub const TAG_BUCKET_ARN: &str = "bucket-arn";
/// Tag recording the region of the bucket a queue receives events from
pub const TAG_BUCKET_REGION: &str = "bucket-region";
/// Tag recording the source instance owning a queue
pub const TAG_OWNED_BY: &str = "owned-by";

/// Prefix of the names of queues created for sources
const QUEUE_NAME_PREFIX: &str = "s3-events_";

/// The queue backing a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsuredQueue {
    /// A queue supplied by the user. Never touched.
    UserProvided {
        arn: Arn,
    },

    /// A queue managed on behalf of the source
    Managed {
        /// Queue URL
        url: String,
        /// Queue ARN
        arn: Arn,
        /// Raw policy document currently attached to the queue, empty if none
        policy: String,
        /// Whether the queue was created during this call
        created: bool,
    },
}

impl EnsuredQueue {
    /// ARN of the queue
    pub fn arn(&self) -> &Arn {
        match self {
            EnsuredQueue::UserProvided { arn } => arn,
            EnsuredQueue::Managed { arn, .. } => arn,
        }
    }
}

/// Outcome of a queue teardown
///
/// Teardown must not block the deletion of the source, so conditions the
/// reconciler cannot recover from are reported as warnings rather than
/// errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Teardown {
    /// The queue was deleted
    Deleted { url: String },
    /// Nothing to delete
    Skipped(String),
    /// Deletion was abandoned for a reason that needs user attention
    Warning(String),
}

/// Name of the queue managed for the given source.
///
/// Derived from the bucket name only, so repeated reconciles of the same
/// source always target the same queue.
pub fn queue_name(src: &S3Source) -> String {
    format!("{}{}", QUEUE_NAME_PREFIX, src.bucket_name())
}

/// Tags to set on a queue created for the given source
pub fn queue_tags(src: &S3Source) -> HashMap<String, String> {
    HashMap::from([
        (TAG_BUCKET_ARN.to_string(), src.spec.arn.real_bucket_arn()),
        (TAG_BUCKET_REGION.to_string(), src.spec.arn.region.clone()),
        (TAG_OWNED_BY.to_string(), src.source_id()),
    ])
}

/// Ensure the existence of a queue for sending the source's bucket
/// notifications to.
///
/// On success the queue's ARN is recorded in the source's status.
///
/// # Errors
///
/// Every error is terminal for the call. API rejections (authorization,
/// malformed requests) require user intervention and are not worth retrying
/// until the source changes.
pub async fn ensure_queue(src: &mut S3Source, cli: &dyn QueueApi) -> Result<EnsuredQueue> {
    if let Some(user_queue) = src.user_provided_queue() {
        let arn = user_queue.clone();
        debug!(queue_arn = %arn, "Using user-provided queue");
        src.status.queue_arn = Some(arn.clone());
        return Ok(EnsuredQueue::UserProvided { arn });
    }

    let name = queue_name(src);

    let (url, created) = match cli.queue_url(&name).await {
        Ok(url) => (url, false),
        Err(e) if e.is_not_found() => {
            let url = cli.create_queue(&name, &queue_tags(src)).await.map_err(|e| {
                e.context("error creating SQS queue for event notifications")
            })?;
            info!(queue = %name, queue_url = %url, "Created SQS queue");
            (url, true)
        }
        Err(e) if e.is_api_rejection() => {
            return Err(e.context("request to SQS API got rejected"));
        }
        Err(e) => return Err(e.context("failed to determine URL of SQS queue")),
    };

    let mut attrs = cli
        .queue_attributes(&url, &[QueueAttribute::QueueArn, QueueAttribute::Policy])
        .await
        .map_err(|e| e.context("getting attributes of SQS queue"))?;

    let arn: Arn = attrs
        .remove(&QueueAttribute::QueueArn)
        .ok_or_else(|| Error::invalid_arn(format!("SQS queue {} has no ARN attribute", url)))?
        .parse()?;

    src.status.queue_arn = Some(arn.clone());

    Ok(EnsuredQueue::Managed {
        url,
        arn,
        policy: attrs.remove(&QueueAttribute::Policy).unwrap_or_default(),
        created,
    })
}

/// Ensure that the queue created for sending the source's bucket
/// notifications is deleted.
pub async fn ensure_no_queue(src: &S3Source, cli: &dyn QueueApi) -> Result<Teardown> {
    if src.user_provided_queue().is_some() {
        return Ok(Teardown::Skipped("queue is managed by the user".to_string()));
    }

    let name = queue_name(src);

    let url = match cli.queue_url(&name).await {
        Ok(url) => url,
        Err(e) if e.is_not_found() => {
            return Ok(Teardown::Skipped(format!(
                "queue {:?} not found, skipping deletion",
                name
            )));
        }
        Err(e) if e.is_denied() => {
            // Unlikely to recover from auth errors while finalizing
            warn!(queue = %name, error = %e, "Authorization error getting SQS queue. Ignoring");
            return Ok(Teardown::Warning(format!(
                "authorization error getting SQS queue: {}",
                e
            )));
        }
        Err(e) => return Err(e.context("failed to determine URL of SQS queue")),
    };

    let owns = assert_ownership(cli, &url, src)
        .await
        .map_err(|e| e.context("failed to verify owner of SQS queue"))?;

    if !owns {
        return Ok(Teardown::Skipped(format!(
            "queue {:?} is not owned by this source instance, skipping deletion",
            url
        )));
    }

    match cli.delete_queue(&url).await {
        Ok(()) => {
            info!(queue_url = %url, "Deleted SQS queue");
            Ok(Teardown::Deleted { url })
        }
        Err(e) if e.is_not_found() => Ok(Teardown::Skipped(format!(
            "queue {:?} disappeared before deletion",
            url
        ))),
        Err(e) if e.is_denied() => {
            warn!(queue_url = %url, error = %e, "Authorization error deleting SQS queue. Ignoring");
            Ok(Teardown::Warning(format!(
                "authorization error deleting SQS queue: {}",
                e
            )))
        }
        Err(e) => Err(e.context("error deleting SQS queue")),
    }
}

/// Whether the queue at `url` is owned by the given source
async fn assert_ownership(cli: &dyn QueueApi, url: &str, src: &S3Source) -> Result<bool> {
    let tags = cli.queue_tags(url).await?;
    Ok(tags.get(TAG_OWNED_BY).map(String::as_str) == Some(src.source_id().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ObjectMeta;

    fn source() -> S3Source {
        S3Source::new(
            ObjectMeta::new("default", "my-source"),
            Arn::new("s3", "us-east-1", "111", "mybucket"),
        )
    }

    #[test]
    fn queue_name_derives_from_bucket() {
        assert_eq!(queue_name(&source()), "s3-events_mybucket");
    }

    #[test]
    fn queue_tags_record_bucket_and_owner() {
        let tags = queue_tags(&source());
        assert_eq!(tags[TAG_BUCKET_ARN], "arn:aws:s3:::mybucket");
        assert_eq!(tags[TAG_BUCKET_REGION], "us-east-1");
        assert_eq!(tags[TAG_OWNED_BY], "io.triggermesh.awss3sources.default.my-source");
    }

    #[test]
    fn ensured_queue_arn() {
        let arn = Arn::new("sqs", "us-east-1", "111", "q");
        let queue = EnsuredQueue::Managed {
            url: "https://sqs/q".to_string(),
            arn: arn.clone(),
            policy: String::new(),
            created: false,
        };
        assert_eq!(queue.arn(), &arn);
    }
}
