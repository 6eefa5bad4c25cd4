//! Test doubles and common utilities for contract tests
//!
//! `FakeAws` is an in-memory stand-in for the queue and bucket notification
//! APIs. It keeps just enough state to observe convergence, counts every
//! call, and can be told to fail specific operations.

#![allow(dead_code)]

use async_trait::async_trait;
use s3hook_core::arn::Arn;
use s3hook_core::config::ReconcilerConfig;
use s3hook_core::error::{Error, Result};
use s3hook_core::policy::Policy;
use s3hook_core::queue::TAG_OWNED_BY;
use s3hook_core::reconciler::{SubscriptionEvent, SubscriptionReconciler};
use s3hook_core::source::{ObjectMeta, S3Source};
use s3hook_core::traits::{
    BucketNotificationApi, ClientGetter, Clients, QueueApi, QueueAttribute, QueueNotification,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const REGION: &str = "us-east-1";
pub const ACCOUNT: &str = "111";
pub const BUCKET: &str = "mybucket";

/// Operations that modify provider state
const WRITE_OPS: &[&str] = &[
    "CreateQueue",
    "SetQueueAttributes",
    "DeleteQueue",
    "PutBucketNotificationConfiguration",
];

/// Error class injected into a fake operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    Denied,
    Provider,
}

impl Failure {
    fn to_error(self, op: &str) -> Error {
        match self {
            Failure::NotFound => Error::not_found(format!("{}: resource does not exist", op)),
            Failure::Denied => Error::denied(format!("{}: access denied", op)),
            Failure::Provider => Error::provider("fake", format!("{}: generic provider error", op)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeQueue {
    pub name: String,
    pub url: String,
    pub arn: String,
    pub policy: Option<String>,
    pub tags: HashMap<String, String>,
}

#[derive(Default)]
struct FakeState {
    queues: HashMap<String, FakeQueue>,
    notifications: HashMap<String, Vec<QueueNotification>>,
    missing_buckets: HashSet<String>,
    calls: HashMap<&'static str, usize>,
    log: Vec<&'static str>,
    failures: HashMap<&'static str, Failure>,
}

/// In-memory queue and bucket notification APIs
#[derive(Clone)]
pub struct FakeAws {
    region: String,
    account: String,
    state: Arc<Mutex<FakeState>>,
}

impl FakeAws {
    pub fn new() -> Self {
        Self {
            region: REGION.to_string(),
            account: ACCOUNT.to_string(),
            state: Arc::new(Mutex::new(FakeState::default())),
        }
    }

    /// Make every subsequent call of `op` fail
    pub fn fail(&self, op: &'static str, failure: Failure) {
        self.state.lock().unwrap().failures.insert(op, failure);
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Mark a bucket as nonexistent
    pub fn remove_bucket(&self, bucket: &str) {
        self.state
            .lock()
            .unwrap()
            .missing_buckets
            .insert(bucket.to_string());
    }

    /// Add a queue as if created out of band
    pub fn add_queue(&self, name: &str, tags: HashMap<String, String>) -> FakeQueue {
        let queue = FakeQueue {
            name: name.to_string(),
            url: self.queue_url_for(name),
            arn: self.queue_arn_for(name),
            policy: None,
            tags,
        };
        self.state
            .lock()
            .unwrap()
            .queues
            .insert(name.to_string(), queue.clone());
        queue
    }

    /// Overwrite the raw policy document of a queue
    pub fn set_raw_policy(&self, name: &str, policy: &str) {
        if let Some(queue) = self.state.lock().unwrap().queues.get_mut(name) {
            queue.policy = Some(policy.to_string());
        }
    }

    /// Add a notification as if configured out of band
    pub fn add_notification(&self, bucket: &str, notification: QueueNotification) {
        self.state
            .lock()
            .unwrap()
            .notifications
            .entry(bucket.to_string())
            .or_default()
            .push(notification);
    }

    pub fn queue(&self, name: &str) -> Option<FakeQueue> {
        self.state.lock().unwrap().queues.get(name).cloned()
    }

    pub fn queue_count(&self) -> usize {
        self.state.lock().unwrap().queues.len()
    }

    pub fn notifications(&self, bucket: &str) -> Vec<QueueNotification> {
        self.state
            .lock()
            .unwrap()
            .notifications
            .get(bucket)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of calls made to `op`
    pub fn calls(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(op)
            .copied()
            .unwrap_or(0)
    }

    /// Number of calls made to operations that modify provider state
    pub fn writes(&self) -> usize {
        WRITE_OPS.iter().map(|op| self.calls(op)).sum()
    }

    /// Total number of calls made
    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    /// Operations called so far, in call order
    pub fn call_log(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn reset_calls(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.clear();
        state.log.clear();
    }

    pub fn queue_url_for(&self, name: &str) -> String {
        format!("https://sqs.{}.amazonaws.com/{}/{}", self.region, self.account, name)
    }

    pub fn queue_arn_for(&self, name: &str) -> String {
        format!("arn:aws:sqs:{}:{}:{}", self.region, self.account, name)
    }

    pub fn clients(&self) -> Clients {
        Clients {
            queues: Arc::new(self.clone()),
            notifications: Arc::new(self.clone()),
        }
    }

    /// Count the call and return the injected failure, if any
    fn record(&self, op: &'static str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(op).or_default() += 1;
        state.log.push(op);
        match state.failures.get(op) {
            Some(failure) => Err(failure.to_error(op)),
            None => Ok(()),
        }
    }
}

fn find_by_url<'a>(state: &'a mut FakeState, url: &str) -> Result<&'a mut FakeQueue> {
    state
        .queues
        .values_mut()
        .find(|q| q.url == url)
        .ok_or_else(|| Error::not_found(format!("queue {}", url)))
}

#[async_trait]
impl QueueApi for FakeAws {
    async fn queue_url(&self, queue_name: &str) -> Result<String> {
        self.record("GetQueueUrl")?;
        let state = self.state.lock().unwrap();
        state
            .queues
            .get(queue_name)
            .map(|q| q.url.clone())
            .ok_or_else(|| Error::not_found(format!("queue {}", queue_name)))
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        tags: &HashMap<String, String>,
    ) -> Result<String> {
        self.record("CreateQueue")?;
        Ok(self.add_queue(queue_name, tags.clone()).url)
    }

    async fn queue_attributes(
        &self,
        queue_url: &str,
        attributes: &[QueueAttribute],
    ) -> Result<HashMap<QueueAttribute, String>> {
        self.record("GetQueueAttributes")?;
        let mut state = self.state.lock().unwrap();
        let queue = find_by_url(&mut state, queue_url)?;

        let mut out = HashMap::new();
        for attr in attributes {
            match attr {
                QueueAttribute::QueueArn => {
                    out.insert(*attr, queue.arn.clone());
                }
                QueueAttribute::Policy => {
                    if let Some(policy) = &queue.policy {
                        out.insert(*attr, policy.clone());
                    }
                }
            }
        }
        Ok(out)
    }

    async fn set_queue_policy(&self, queue_url: &str, policy: &Policy) -> Result<()> {
        self.record("SetQueueAttributes")?;
        let document = policy.to_json()?;
        let mut state = self.state.lock().unwrap();
        find_by_url(&mut state, queue_url)?.policy = Some(document);
        Ok(())
    }

    async fn queue_tags(&self, queue_url: &str) -> Result<HashMap<String, String>> {
        self.record("ListQueueTags")?;
        let mut state = self.state.lock().unwrap();
        Ok(find_by_url(&mut state, queue_url)?.tags.clone())
    }

    async fn delete_queue(&self, queue_url: &str) -> Result<()> {
        self.record("DeleteQueue")?;
        let mut state = self.state.lock().unwrap();
        let name = find_by_url(&mut state, queue_url)?.name.clone();
        state.queues.remove(&name);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

#[async_trait]
impl BucketNotificationApi for FakeAws {
    async fn queue_notifications(
        &self,
        bucket: &str,
        _expected_owner: &str,
    ) -> Result<Vec<QueueNotification>> {
        self.record("GetBucketNotificationConfiguration")?;
        let state = self.state.lock().unwrap();
        if state.missing_buckets.contains(bucket) {
            return Err(Error::not_found(format!("bucket {}", bucket)));
        }
        Ok(state.notifications.get(bucket).cloned().unwrap_or_default())
    }

    async fn put_queue_notifications(
        &self,
        bucket: &str,
        _expected_owner: &str,
        notifications: &[QueueNotification],
    ) -> Result<()> {
        self.record("PutBucketNotificationConfiguration")?;
        let mut state = self.state.lock().unwrap();
        if state.missing_buckets.contains(bucket) {
            return Err(Error::not_found(format!("bucket {}", bucket)));
        }
        state
            .notifications
            .insert(bucket.to_string(), notifications.to_vec());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// A ClientGetter handing out the fake's clients, or a configured error
pub struct MockClientGetter {
    fake: FakeAws,
    failure: Option<fn() -> Error>,
    get_call_count: Arc<AtomicUsize>,
}

impl MockClientGetter {
    pub fn new(fake: &FakeAws) -> Self {
        Self {
            fake: fake.clone(),
            failure: None,
            get_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every subsequent get() fail with the error built by `error`
    pub fn failing_with(fake: &FakeAws, error: fn() -> Error) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(fake)
        }
    }

    pub fn get_call_count(&self) -> usize {
        self.get_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientGetter for MockClientGetter {
    async fn get(&self, _source: &S3Source) -> Result<Clients> {
        self.get_call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failure {
            return Err(error());
        }
        Ok(self.fake.clients())
    }
}

/// The source used across scenarios: bucket "mybucket" of account "111"
pub fn test_source() -> S3Source {
    S3Source::new(
        ObjectMeta::new("default", "my-source"),
        Arn::new("s3", REGION, ACCOUNT, BUCKET),
    )
}

/// A reconciler backed by the given client getter
pub fn reconciler_with(
    getter: MockClientGetter,
) -> (SubscriptionReconciler, mpsc::Receiver<SubscriptionEvent>) {
    SubscriptionReconciler::new(Arc::new(getter), ReconcilerConfig::default())
        .expect("default reconciler config is valid")
}

/// A reconciler backed by the fake
pub fn reconciler_for(
    fake: &FakeAws,
) -> (SubscriptionReconciler, mpsc::Receiver<SubscriptionEvent>) {
    reconciler_with(MockClientGetter::new(fake))
}

/// Drain all events currently queued
pub fn drain(rx: &mut mpsc::Receiver<SubscriptionEvent>) -> Vec<SubscriptionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Tags marking a queue as owned by the given source
pub fn owned_by(src: &S3Source) -> HashMap<String, String> {
    HashMap::from([(TAG_OWNED_BY.to_string(), src.source_id())])
}
