//! Contract Test: User-Supplied Destination Immutability
//!
//! A queue supplied in the source's destination belongs to the user.
//!
//! Constraints verified:
//! - No queue API call is made for it, during reconcile or finalize
//! - Its ARN is still used as the notification target
//! - The bucket notification is still managed by the source

mod common;

use common::*;
use s3hook_core::arn::Arn;
use s3hook_core::queue::{EnsuredQueue, Teardown, ensure_no_queue, ensure_queue};
use s3hook_core::status::CONDITION_SUBSCRIBED;
use tokio_test::assert_ok;

fn user_queue() -> Arn {
    Arn::new("sqs", REGION, ACCOUNT, "my-own-queue")
}

const QUEUE_OPS: &[&str] = &[
    "GetQueueUrl",
    "CreateQueue",
    "GetQueueAttributes",
    "SetQueueAttributes",
    "ListQueueTags",
    "DeleteQueue",
];

fn queue_calls(fake: &FakeAws) -> usize {
    QUEUE_OPS.iter().map(|op| fake.calls(op)).sum()
}

#[tokio::test]
async fn ensure_queue_returns_user_queue_without_calls() {
    let fake = FakeAws::new();
    let mut src = test_source().with_destination_queue(user_queue());

    let queue = assert_ok!(ensure_queue(&mut src, fake.clients().queues.as_ref()).await);

    assert_eq!(queue, EnsuredQueue::UserProvided { arn: user_queue() });
    assert_eq!(src.status.queue_arn, Some(user_queue()));
    assert_eq!(fake.total_calls(), 0);
}

#[tokio::test]
async fn reconcile_targets_user_queue() {
    let fake = FakeAws::new();
    let (reconciler, _events) = reconciler_for(&fake);
    let mut src = test_source().with_destination_queue(user_queue());

    let conditions = reconciler.reconcile(&mut src).await;

    assert!(conditions.get(CONDITION_SUBSCRIBED).unwrap().is_true());
    assert_eq!(queue_calls(&fake), 0);
    assert_eq!(fake.queue_count(), 0);

    let notifications = fake.notifications(BUCKET);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].queue_arn, user_queue().to_string());
}

#[tokio::test]
async fn finalize_leaves_user_queue_alone() {
    let fake = FakeAws::new();
    let (reconciler, _events) = reconciler_for(&fake);
    let mut src = test_source().with_destination_queue(user_queue());

    reconciler.reconcile(&mut src).await;
    let conditions = reconciler.finalize(&src).await;

    assert!(conditions.get(CONDITION_SUBSCRIBED).unwrap().is_true());
    assert_eq!(queue_calls(&fake), 0);
    assert!(fake.notifications(BUCKET).is_empty());
}

#[tokio::test]
async fn teardown_skips_user_queue() {
    let fake = FakeAws::new();
    let src = test_source().with_destination_queue(user_queue());

    let outcome = assert_ok!(ensure_no_queue(&src, fake.clients().queues.as_ref()).await);

    assert!(matches!(outcome, Teardown::Skipped(_)));
    assert_eq!(fake.total_calls(), 0);
}
