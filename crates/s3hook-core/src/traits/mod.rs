//! Core traits for the S3 subscription hook
//!
//! This module defines the abstract interfaces over the provider APIs the
//! reconciler drives.
//!
//! - [`QueueApi`]: Manage message queues, their policies and tags
//! - [`BucketNotificationApi`]: Read and write a bucket's queue notifications
//! - [`ClientGetter`]: Obtain provider clients for a given source
//! - [`SecretStore`]: Resolve secret references declared by sources

pub mod queue_api;
pub mod notification_api;
pub mod client_getter;
pub mod secret_store;

pub use queue_api::{QueueApi, QueueAttribute};
pub use notification_api::{BucketNotificationApi, QueueNotification};
pub use client_getter::{ClientGetter, Clients};
pub use secret_store::SecretStore;
