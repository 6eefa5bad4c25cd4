// # s3hook-core
//
// Core library of the S3 event notification subscription hook.
//
// ## Architecture Overview
//
// For each `AWSS3Source` object, the hook makes sure that:
// - a queue exists to receive the bucket's event notifications (unless the
//   user supplies one),
// - the queue's access policy lets the bucket send messages to it,
// - the bucket's notification configuration targets the queue.
//
// On deletion of the object, the queue is deleted if this hook created it
// and the notification is removed from the bucket.
//
// - **QueueApi** / **BucketNotificationApi**: Traits over the provider APIs
// - **ClientGetter**: Trait for obtaining provider clients per source
// - **SecretStore**: Trait for resolving secret references
// - **SubscriptionReconciler**: Orchestrates reconcile and finalize
// - **HandlerRegistry**: Routes hook requests by object kind
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider implementations
// 2. **Level-Triggered**: Every call recomputes the desired state from scratch
// 3. **Idempotency**: Reconciling a converged source performs no writes
// 4. **Conditions as Data**: Failures are reported in status, never as control flow

pub mod arn;
pub mod config;
pub mod deadline;
pub mod error;
pub mod hook;
pub mod notifications;
pub mod policy;
pub mod queue;
pub mod reconciler;
pub mod registry;
pub mod secrets;
pub mod source;
pub mod status;
pub mod traits;

// Re-export core types for convenience
pub use arn::Arn;
pub use config::{AwsProviderConfig, HookConfig, ReconcilerConfig, SecretStoreConfig};
pub use error::{Error, Result};
pub use hook::{HookOperation, HookRequest, HookResponse, HookStatus};
pub use reconciler::{S3SourceHandler, SubscriptionEvent, SubscriptionReconciler};
pub use registry::{GroupVersionKind, HandlerRegistry, ManagedObject};
pub use secrets::{FileSecretStore, MemorySecretStore};
pub use source::S3Source;
pub use traits::{BucketNotificationApi, ClientGetter, Clients, QueueApi, SecretStore};
