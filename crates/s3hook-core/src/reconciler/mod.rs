//! Subscription reconciler
//!
//! Drives a source's bucket notification subscription towards its desired
//! state and reports the outcome as a `Subscribed` condition.
//!
//! ## Flow
//!
//! ```text
//! reconcile:  clients ──► ensure_queue ──► sync_queue_policy ──► enable notifications ──► True
//!                │              │                  │                      │
//!                ▼              ▼                  ▼                      ▼
//!          False[NoClient] False[ReconcileQueue] False[SyncQueuePolicy] False[ConfigureNotifications]
//!
//! finalize:   clients ──► disable notifications ──► ensure_no_queue ──► True
//!                │
//!                ├─ secret missing ──► True
//!                └─ other error ────► False[NoClient]
//! ```
//!
//! Every step is idempotent and attempted once per call. Failures are
//! reported as condition data, never as errors: the owning controller
//! decides when to call again.

mod handler;

pub use handler::S3SourceHandler;

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use crate::arn::Arn;
use crate::config::ReconcilerConfig;
use crate::deadline::with_deadline;
use crate::error::Result;
use crate::notifications::{
    NotificationsDisabled, NotificationsEnabled, ensure_notifications_disabled,
    ensure_notifications_enabled,
};
use crate::queue::{EnsuredQueue, PolicySync, Teardown, ensure_no_queue, ensure_queue, sync_queue_policy};
use crate::source::S3Source;
use crate::status::{CONDITION_SUBSCRIBED, Conditions, SubscribedReason};
use crate::traits::{ClientGetter, Clients};

/// Events emitted by the reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionEvent {
    /// A queue was created for the source
    QueueCreated { source: String, queue_arn: Arn },

    /// The access policy of the source's queue was written
    QueuePolicyUpdated { source: String, queue_arn: Arn },

    /// The bucket configuration was written to deliver events to the queue
    NotificationsEnabled { source: String, queue_arn: Arn },

    /// The source's notification was removed from the bucket
    NotificationsDisabled { source: String },

    /// The source's queue was deleted
    QueueDeleted { source: String, queue_url: String },

    /// A reconcile step failed
    ReconcileFailed {
        source: String,
        reason: SubscribedReason,
        error: String,
    },

    /// A teardown step was abandoned, leaving resources behind
    Warning { source: String, message: String },
}

/// Reconciler of S3 event notification subscriptions
///
/// ## Threading
///
/// The reconciler holds no per-source state. Concurrent calls for distinct
/// sources are safe; calls for the same source should be serialized by the
/// caller.
pub struct SubscriptionReconciler {
    /// Source of provider clients
    client_getter: Arc<dyn ClientGetter>,

    /// Reconciler settings
    config: ReconcilerConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SubscriptionEvent>,
}

impl SubscriptionReconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `client_getter`: Source of provider clients
    /// - `config`: Reconciler configuration
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields
    /// subscription events
    pub fn new(
        client_getter: Arc<dyn ClientGetter>,
        config: ReconcilerConfig,
    ) -> Result<(Self, mpsc::Receiver<SubscriptionEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let reconciler = Self {
            client_getter,
            config,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// Reconcile the source's subscription
    ///
    /// On success the queue ARN is recorded in `src.status`.
    ///
    /// # Returns
    ///
    /// Conditions holding exactly one `Subscribed` condition
    pub async fn reconcile(&self, src: &mut S3Source) -> Conditions {
        let mut conditions = Conditions::new();
        conditions.mark_unknown(CONDITION_SUBSCRIBED, "Unknown", "");

        match self.reconcile_subscription(src).await {
            Ok(()) => conditions.mark_true(CONDITION_SUBSCRIBED),
            Err((reason, message)) => {
                conditions.mark_false(CONDITION_SUBSCRIBED, reason.as_str(), message)
            }
        }

        conditions
    }

    async fn reconcile_subscription(
        &self,
        src: &mut S3Source,
    ) -> std::result::Result<(), (SubscribedReason, &'static str)> {
        let id = src.source_id();

        let clients = match self.clients(src).await {
            Ok(clients) => clients,
            Err(e) => {
                error!(source = %id, error = %e, "Error creating AWS API clients");
                self.fail(&id, SubscribedReason::NoClient, e.to_string());
                return Err((SubscribedReason::NoClient, "Cannot obtain AWS API clients"));
            }
        };

        let queue = match ensure_queue(src, clients.queues.as_ref()).await {
            Ok(queue) => queue,
            Err(e) => {
                error!(source = %id, error = %e, "Failed to reconcile SQS queue");
                self.fail(&id, SubscribedReason::ReconcileQueue, e.to_string());
                return Err((SubscribedReason::ReconcileQueue, "Failed to reconcile SQS queue"));
            }
        };

        if let EnsuredQueue::Managed {
            url,
            arn,
            policy,
            created,
        } = &queue
        {
            if *created {
                self.emit_event(SubscriptionEvent::QueueCreated {
                    source: id.clone(),
                    queue_arn: arn.clone(),
                });
            }

            match sync_queue_policy(clients.queues.as_ref(), url, arn, policy, src).await {
                Ok(PolicySync::Updated) => self.emit_event(SubscriptionEvent::QueuePolicyUpdated {
                    source: id.clone(),
                    queue_arn: arn.clone(),
                }),
                Ok(PolicySync::Unchanged) => {}
                Err(e) => {
                    error!(source = %id, error = %e, "Failed to synchronize SQS queue policy");
                    self.fail(&id, SubscribedReason::SyncQueuePolicy, e.to_string());
                    return Err((
                        SubscribedReason::SyncQueuePolicy,
                        "Cannot synchronize SQS queue policy",
                    ));
                }
            }
        }

        let queue_arn = queue.arn();
        match ensure_notifications_enabled(src, queue_arn, clients.notifications.as_ref()).await {
            Ok(NotificationsEnabled::Updated) => {
                self.emit_event(SubscriptionEvent::NotificationsEnabled {
                    source: id.clone(),
                    queue_arn: queue_arn.clone(),
                })
            }
            Ok(NotificationsEnabled::Unchanged) => {}
            Err(e) => {
                error!(source = %id, error = %e, "Failed to configure SQS queue notifications");
                self.fail(&id, SubscribedReason::ConfigureNotifications, e.to_string());
                return Err((
                    SubscribedReason::ConfigureNotifications,
                    "Cannot configure SQS notifications",
                ));
            }
        }

        info!(source = %id, queue_arn = %queue_arn, "Subscription reconciled");
        Ok(())
    }

    /// Tear down the source's subscription
    ///
    /// Teardown never blocks the deletion of the source: failures are
    /// logged and absorbed, and a missing secret counts as nothing left to
    /// clean up. Only a failure to obtain clients for any other reason is
    /// reported as `False`.
    pub async fn finalize(&self, src: &S3Source) -> Conditions {
        let mut conditions = Conditions::new();
        conditions.mark_true(CONDITION_SUBSCRIBED);

        let id = src.source_id();

        let clients = match self.clients(src).await {
            Ok(clients) => clients,
            Err(e) if e.is_secret_not_found() => {
                error!(source = %id, error = %e, "Secret missing while finalizing event source. Ignoring");
                return conditions;
            }
            Err(e) => {
                error!(source = %id, error = %e, "Error creating AWS API clients");
                conditions.mark_false(
                    CONDITION_SUBSCRIBED,
                    SubscribedReason::NoClient.as_str(),
                    "Cannot obtain AWS API clients",
                );
                return conditions;
            }
        };

        match ensure_notifications_disabled(src, clients.notifications.as_ref()).await {
            Ok(NotificationsDisabled::Removed) => {
                self.emit_event(SubscriptionEvent::NotificationsDisabled { source: id.clone() })
            }
            Ok(NotificationsDisabled::Absent | NotificationsDisabled::BucketGone) => {}
            Err(e) => error!(source = %id, error = %e, "Failed to disable S3 notifications"),
        }

        match ensure_no_queue(src, clients.queues.as_ref()).await {
            Ok(Teardown::Deleted { url }) => self.emit_event(SubscriptionEvent::QueueDeleted {
                source: id.clone(),
                queue_url: url,
            }),
            Ok(Teardown::Skipped(reason)) => debug!(source = %id, "{}", reason),
            Ok(Teardown::Warning(message)) => self.emit_event(SubscriptionEvent::Warning {
                source: id.clone(),
                message,
            }),
            Err(e) => error!(source = %id, error = %e, "Failed to finalize SQS queue"),
        }

        conditions
    }

    /// Obtain clients for the source, bounded by the call deadline
    async fn clients(&self, src: &S3Source) -> Result<Clients> {
        let timeout = self.config.call_timeout();
        let clients = with_deadline(timeout, "GetClients", self.client_getter.get(src)).await?;
        Ok(clients.with_deadline(timeout))
    }

    fn fail(&self, source: &str, reason: SubscribedReason, error: String) {
        self.emit_event(SubscriptionEvent::ReconcileFailed {
            source: source.to_string(),
            reason,
            error,
        });
    }

    /// Emit an event (non-blocking)
    fn emit_event(&self, event: SubscriptionEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, discarding event");
            }
        }
    }
}
