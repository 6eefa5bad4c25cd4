//! Hook wire format
//!
//! The owning controller sends one request per operation on a managed
//! object and expects the object's status back.
//!
//! ```json
//! {
//!   "operation": "reconcile",
//!   "object": {
//!     "apiVersion": "sources.triggermesh.io/v1alpha1",
//!     "kind": "AWSS3Source",
//!     "metadata": { "namespace": "default", "name": "my-source" },
//!     "spec": { "arn": "arn:aws:s3:us-east-1:111:mybucket" }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::arn::Arn;
use crate::error::{Error, Result};
use crate::registry::GroupVersionKind;
use crate::status::Conditions;

/// Operation requested on a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookOperation {
    Reconcile,
    Finalize,
}

/// A request from the owning controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookRequest {
    pub operation: HookOperation,
    pub object: serde_json::Value,
}

impl HookRequest {
    /// Type of the object carried by the request
    pub fn object_kind(&self) -> Result<GroupVersionKind> {
        let api_version = self
            .object
            .get("apiVersion")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::invalid_input("object has no apiVersion"))?;
        let kind = self
            .object
            .get("kind")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::invalid_input("object has no kind"))?;

        GroupVersionKind::from_api_version(api_version, kind)
    }
}

/// Status returned to the owning controller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookStatus {
    pub conditions: Conditions,

    #[serde(
        default,
        rename = "queueARN",
        alias = "queueArn",
        skip_serializing_if = "Option::is_none"
    )]
    pub queue_arn: Option<Arn>,
}

/// Response to a hook request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HookResponse {
    pub status: HookStatus,
}

impl HookResponse {
    pub fn new(conditions: Conditions, queue_arn: Option<Arn>) -> Self {
        Self {
            status: HookStatus {
                conditions,
                queue_arn,
            },
        }
    }
}
