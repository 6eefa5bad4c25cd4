//! Access policy of managed queues

use tracing::{debug, info};

use crate::arn::Arn;
use crate::error::Result;
use crate::policy::{Effect, Policy, PolicyStatement, Principal};
use crate::source::S3Source;
use crate::traits::QueueApi;

/// Service principal of S3 event notifications
const S3_SERVICE_PRINCIPAL: &str = "s3.amazonaws.com";

/// Outcome of a policy synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicySync {
    /// The current policy already grants the desired permissions
    Unchanged,
    /// The desired policy was written to the queue
    Updated,
}

/// Policy allowing the source's bucket to send event notifications to the
/// queue with the given ARN.
pub fn make_queue_policy(queue_arn: &Arn, src: &S3Source) -> Policy {
    let statement = PolicyStatement::new(Effect::Allow)
        .with_principal(Principal::service(S3_SERVICE_PRINCIPAL))
        .with_condition("ArnEquals", "aws:SourceArn", src.spec.arn.real_bucket_arn())
        .with_condition(
            "StringEquals",
            "aws:SourceAccount",
            src.spec.arn.account_id.clone(),
        )
        .with_action("sqs:SendMessage")
        .with_resource(queue_arn.to_string());

    Policy::new([statement])
}

/// Ensure the queue at `queue_url` carries the access policy required by
/// the source.
///
/// `current_raw` is the policy document read together with the queue ARN.
/// It is parsed leniently: a queue without a policy, or with an unparseable
/// one, simply gets the desired policy.
pub async fn sync_queue_policy(
    cli: &dyn QueueApi,
    queue_url: &str,
    queue_arn: &Arn,
    current_raw: &str,
    src: &S3Source,
) -> Result<PolicySync> {
    let desired = make_queue_policy(queue_arn, src);
    let current = Policy::parse_lenient(current_raw);

    if desired.semantically_equals(&current) {
        debug!(queue_url, "Queue policy is up to date");
        return Ok(PolicySync::Unchanged);
    }

    cli.set_queue_policy(queue_url, &desired)
        .await
        .map_err(|e| e.context("error setting SQS queue policy"))?;

    info!(queue_url, "Updated queue policy");
    Ok(PolicySync::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ObjectMeta;

    #[test]
    fn policy_scopes_bucket_and_account() {
        let src = S3Source::new(
            ObjectMeta::new("default", "my-source"),
            Arn::new("s3", "us-east-1", "111", "mybucket"),
        );
        let queue_arn = Arn::new("sqs", "us-east-1", "111", "s3-events_mybucket");

        let policy = make_queue_policy(&queue_arn, &src);
        let statement = &policy.statement[0];

        assert_eq!(policy.statement.len(), 1);
        assert_eq!(statement.effect, Effect::Allow);
        assert!(
            statement
                .principal
                .as_ref()
                .and_then(|p| p.get("Service"))
                .is_some_and(|s| s.contains("s3.amazonaws.com"))
        );
        assert!(statement.condition["ArnEquals"]["aws:SourceArn"].contains("arn:aws:s3:::mybucket"));
        assert!(statement.condition["StringEquals"]["aws:SourceAccount"].contains("111"));
        assert!(statement.action.contains("sqs:SendMessage"));
        assert!(
            statement
                .resource
                .contains("arn:aws:sqs:us-east-1:111:s3-events_mybucket")
        );
    }
}
