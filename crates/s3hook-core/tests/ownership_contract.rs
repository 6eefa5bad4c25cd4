//! Contract Test: Ownership Safety
//!
//! The `owned-by` tag is the sole authority for deleting a queue.
//!
//! Constraints verified:
//! - A queue tagged with the source's ID is deleted
//! - A queue tagged by another source, or untagged, is never deleted
//! - Authorization failures during teardown become warnings

mod common;

use common::*;
use s3hook_core::queue::{TAG_OWNED_BY, Teardown, ensure_no_queue};
use std::collections::HashMap;
use tokio_test::{assert_err, assert_ok};

const QUEUE_NAME: &str = "s3-events_mybucket";

#[tokio::test]
async fn owned_queue_is_deleted() {
    let fake = FakeAws::new();
    let src = test_source();
    let queue = fake.add_queue(QUEUE_NAME, owned_by(&src));
    let api = fake.clients().queues;

    let outcome = assert_ok!(ensure_no_queue(&src, api.as_ref()).await);

    assert_eq!(outcome, Teardown::Deleted { url: queue.url });
    assert_eq!(fake.queue_count(), 0);
}

#[tokio::test]
async fn foreign_queue_is_kept() {
    let fake = FakeAws::new();
    let src = test_source();
    fake.add_queue(
        QUEUE_NAME,
        HashMap::from([(
            TAG_OWNED_BY.to_string(),
            "io.triggermesh.awss3sources.other.my-source".to_string(),
        )]),
    );
    let api = fake.clients().queues;

    let outcome = assert_ok!(ensure_no_queue(&src, api.as_ref()).await);

    assert!(matches!(outcome, Teardown::Skipped(_)));
    assert_eq!(fake.calls("DeleteQueue"), 0);
    assert_eq!(fake.queue_count(), 1);
}

#[tokio::test]
async fn untagged_queue_is_kept() {
    let fake = FakeAws::new();
    let src = test_source();
    fake.add_queue(QUEUE_NAME, HashMap::new());
    let api = fake.clients().queues;

    let outcome = assert_ok!(ensure_no_queue(&src, api.as_ref()).await);

    assert!(matches!(outcome, Teardown::Skipped(_)));
    assert_eq!(fake.calls("DeleteQueue"), 0);
}

#[tokio::test]
async fn missing_queue_is_skipped() {
    let fake = FakeAws::new();
    let api = fake.clients().queues;

    let outcome = assert_ok!(ensure_no_queue(&test_source(), api.as_ref()).await);

    assert!(matches!(outcome, Teardown::Skipped(_)));
    assert_eq!(fake.calls("ListQueueTags"), 0);
}

#[tokio::test]
async fn denied_lookup_or_delete_is_a_warning() {
    let src = test_source();

    let fake = FakeAws::new();
    fake.add_queue(QUEUE_NAME, owned_by(&src));
    fake.fail("GetQueueUrl", Failure::Denied);
    let outcome = assert_ok!(ensure_no_queue(&src, fake.clients().queues.as_ref()).await);
    assert!(matches!(outcome, Teardown::Warning(_)));

    let fake = FakeAws::new();
    fake.add_queue(QUEUE_NAME, owned_by(&src));
    fake.fail("DeleteQueue", Failure::Denied);
    let outcome = assert_ok!(ensure_no_queue(&src, fake.clients().queues.as_ref()).await);
    assert!(matches!(outcome, Teardown::Warning(_)));
    assert_eq!(fake.queue_count(), 1);
}

#[tokio::test]
async fn unreadable_tags_are_an_error() {
    let fake = FakeAws::new();
    let src = test_source();
    fake.add_queue(QUEUE_NAME, owned_by(&src));
    fake.fail("ListQueueTags", Failure::Provider);

    assert_err!(ensure_no_queue(&src, fake.clients().queues.as_ref()).await);
    assert_eq!(fake.calls("DeleteQueue"), 0);
}
