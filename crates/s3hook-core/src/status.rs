//! Status conditions reported back to the owning controller
//!
//! Conditions are keyed by their type. Setting a condition replaces any
//! previous condition of the same type, so there is never more than one
//! `Subscribed` condition in a status block.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Condition type reporting whether the bucket notifications are wired to a queue
pub const CONDITION_SUBSCRIBED: &str = "Subscribed";

/// Tri-state value of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Reasons set on a `False` Subscribed condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribedReason {
    /// Provider API clients could not be obtained
    NoClient,
    /// The queue could not be found, created or read
    ReconcileQueue,
    /// The queue access policy could not be written
    SyncQueuePolicy,
    /// Bucket notifications could not be configured
    ConfigureNotifications,
}

impl SubscribedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscribedReason::NoClient => "NoClient",
            SubscribedReason::ReconcileQueue => "ReconcileQueue",
            SubscribedReason::SyncQueuePolicy => "SyncQueuePolicy",
            SubscribedReason::ConfigureNotifications => "ConfigureNotifications",
        }
    }
}

impl fmt::Display for SubscribedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, tri-state status field with reason and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Condition type (e.g. "Subscribed")
    #[serde(rename = "type")]
    pub type_: String,

    /// Current value
    pub status: ConditionStatus,

    /// Short machine-readable reason code, empty when `True`
    #[serde(default)]
    pub reason: String,

    /// Human-readable message
    #[serde(default)]
    pub message: String,

    /// Last time `status` changed
    pub last_transition_time: DateTime<Utc>,
}

impl Condition {
    /// Create a condition stamped with the current time
    pub fn new(
        type_: impl Into<String>,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: reason.into(),
            message: message.into(),
            last_transition_time: Utc::now(),
        }
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }
}

/// Conditions keyed by type, serialized as a list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    inner: BTreeMap<String, Condition>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a condition by type
    pub fn get(&self, type_: &str) -> Option<&Condition> {
        self.inner.get(type_)
    }

    /// Insert or replace the condition of the same type.
    ///
    /// When the status does not change, the previous transition time is kept.
    pub fn set(&mut self, mut condition: Condition) {
        if let Some(existing) = self.inner.get(&condition.type_) {
            if existing.status == condition.status {
                condition.last_transition_time = existing.last_transition_time;
            }
        }
        self.inner.insert(condition.type_.clone(), condition);
    }

    /// Mark a condition `True`, clearing its reason
    pub fn mark_true(&mut self, type_: &str) {
        self.set(Condition::new(type_, ConditionStatus::True, "", ""));
    }

    /// Mark a condition `False` with a reason and message
    pub fn mark_false(&mut self, type_: &str, reason: &str, message: impl Into<String>) {
        self.set(Condition::new(type_, ConditionStatus::False, reason, message));
    }

    /// Mark a condition `Unknown` with a reason
    pub fn mark_unknown(&mut self, type_: &str, reason: &str, message: impl Into<String>) {
        self.set(Condition::new(type_, ConditionStatus::Unknown, reason, message));
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.inner.values()
    }
}

impl Serialize for Conditions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.inner.values())
    }
}

impl<'de> Deserialize<'de> for Conditions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = Vec::<Condition>::deserialize(deserializer)?;
        let mut conditions = Conditions::new();
        for condition in list {
            conditions.set(condition);
        }
        Ok(conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_same_type() {
        let mut conditions = Conditions::new();
        conditions.mark_unknown(CONDITION_SUBSCRIBED, "Unknown", "");
        conditions.mark_false(CONDITION_SUBSCRIBED, "NoClient", "Cannot obtain AWS API clients");

        assert_eq!(conditions.len(), 1);
        let subscribed = conditions.get(CONDITION_SUBSCRIBED).unwrap();
        assert_eq!(subscribed.status, ConditionStatus::False);
        assert_eq!(subscribed.reason, "NoClient");
    }

    #[test]
    fn unchanged_status_keeps_transition_time() {
        let mut conditions = Conditions::new();
        conditions.mark_true(CONDITION_SUBSCRIBED);
        let first = conditions.get(CONDITION_SUBSCRIBED).unwrap().last_transition_time;

        conditions.mark_true(CONDITION_SUBSCRIBED);
        let second = conditions.get(CONDITION_SUBSCRIBED).unwrap().last_transition_time;
        assert_eq!(first, second);
    }

    #[test]
    fn serializes_as_list() {
        let mut conditions = Conditions::new();
        conditions.mark_false(CONDITION_SUBSCRIBED, "ReconcileQueue", "Failed to reconcile SQS queue");

        let json = serde_json::to_value(&conditions).unwrap();
        assert_eq!(json[0]["type"], "Subscribed");
        assert_eq!(json[0]["status"], "False");
        assert_eq!(json[0]["reason"], "ReconcileQueue");
        assert!(json[0]["lastTransitionTime"].is_string());

        let back: Conditions = serde_json::from_value(json).unwrap();
        assert_eq!(back, conditions);
    }
}
