//! Handler registry
//!
//! Routes hook requests to the handler registered for the kind of the
//! object they carry, avoiding hardcoded if-else chains in the shell.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use s3hook_core::registry::HandlerRegistry;
//! use s3hook_core::reconciler::S3SourceHandler;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(Arc::new(S3SourceHandler::new(reconciler)));
//!
//! let response = registry.dispatch(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hook::{HookOperation, HookRequest, HookResponse};
use crate::source::{AWS_S3_SOURCE_KIND, S3Source, SOURCES_GROUP, SOURCES_VERSION};

/// API group, version and kind identifying an object type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Build from an object's `apiVersion` ("group/version") and `kind`
    pub fn from_api_version(api_version: &str, kind: &str) -> Result<Self> {
        let (group, version) = api_version.split_once('/').ok_or_else(|| {
            Error::invalid_input(format!("apiVersion {:?} has no group", api_version))
        })?;
        if group.is_empty() || version.is_empty() || kind.is_empty() {
            return Err(Error::invalid_input(format!(
                "incomplete object type {:?}, {:?}",
                api_version, kind
            )));
        }
        Ok(Self::new(group, version, kind))
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

/// API group, version and plural resource name of an object type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

/// The closed set of objects handled by this hook
#[derive(Debug, Clone, PartialEq)]
pub enum ManagedObject {
    AwsS3Source(S3Source),
}

impl ManagedObject {
    /// Decode an object of the given type
    pub fn decode(gvk: &GroupVersionKind, object: serde_json::Value) -> Result<Self> {
        if gvk.group == SOURCES_GROUP
            && gvk.version == SOURCES_VERSION
            && gvk.kind == AWS_S3_SOURCE_KIND
        {
            let src: S3Source = serde_json::from_value(object)
                .map_err(|e| Error::invalid_input(format!("cannot decode {}: {}", gvk, e)))?;
            return Ok(ManagedObject::AwsS3Source(src));
        }

        Err(Error::invalid_input(format!("unsupported object type {}", gvk)))
    }
}

/// Handler of one kind of managed object
#[async_trait]
pub trait Handler: Send + Sync {
    /// Resource handled
    fn group_version_resource(&self) -> GroupVersionResource;

    /// Kind of the objects handled
    fn kind(&self) -> GroupVersionKind;

    /// Drive the object towards its desired state
    ///
    /// # Returns
    ///
    /// - `Ok(HookResponse)`: The object's status, including failures
    /// - `Err(Error)`: The object is not of the handled kind
    async fn reconcile(&self, object: ManagedObject) -> Result<HookResponse>;

    /// Release what the object owns before it is deleted
    async fn finalize(&self, object: ManagedObject) -> Result<HookResponse>;
}

/// Registry of handlers keyed by object kind
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<GroupVersionKind, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any handler of the same kind
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        let gvk = handler.kind();
        debug!(kind = %gvk, "Registered handler");
        self.handlers.insert(gvk, handler);
    }

    /// Whether a handler is registered for the given kind
    pub fn handles(&self, gvk: &GroupVersionKind) -> bool {
        self.handlers.contains_key(gvk)
    }

    /// Kinds with a registered handler
    pub fn kinds(&self) -> Vec<&GroupVersionKind> {
        self.handlers.keys().collect()
    }

    /// Route a request to the handler of its object's kind
    ///
    /// # Returns
    ///
    /// - `Ok(HookResponse)`: The handler's response
    /// - `Err(Error::InvalidInput)`: The object cannot be decoded or no
    ///   handler is registered for its kind
    pub async fn dispatch(&self, request: HookRequest) -> Result<HookResponse> {
        let gvk = request.object_kind()?;

        let handler = self
            .handlers
            .get(&gvk)
            .ok_or_else(|| Error::invalid_input(format!("no handler registered for {}", gvk)))?;

        let object = ManagedObject::decode(&gvk, request.object)?;

        match request.operation {
            HookOperation::Reconcile => handler.reconcile(object).await,
            HookOperation::Finalize => handler.finalize(object).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_api_version() {
        let gvk =
            GroupVersionKind::from_api_version("sources.triggermesh.io/v1alpha1", "AWSS3Source")
                .unwrap();
        assert_eq!(gvk.to_string(), "sources.triggermesh.io/v1alpha1, Kind=AWSS3Source");

        assert!(GroupVersionKind::from_api_version("v1", "ConfigMap").is_err());
    }

    #[test]
    fn decode_unsupported_kind() {
        let gvk = GroupVersionKind::new(SOURCES_GROUP, SOURCES_VERSION, "AWSSQSSource");
        let err = ManagedObject::decode(&gvk, json!({})).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn decode_s3_source() {
        let gvk = GroupVersionKind::new(SOURCES_GROUP, SOURCES_VERSION, AWS_S3_SOURCE_KIND);
        let object = ManagedObject::decode(
            &gvk,
            json!({
                "apiVersion": "sources.triggermesh.io/v1alpha1",
                "kind": "AWSS3Source",
                "metadata": { "namespace": "default", "name": "my-source" },
                "spec": { "arn": "arn:aws:s3:us-east-1:111:mybucket" }
            }),
        )
        .unwrap();

        let ManagedObject::AwsS3Source(src) = object;
        assert_eq!(src.bucket_name(), "mybucket");
    }

    #[test]
    fn decode_malformed_s3_source() {
        let gvk = GroupVersionKind::new(SOURCES_GROUP, SOURCES_VERSION, AWS_S3_SOURCE_KIND);
        let err = ManagedObject::decode(&gvk, json!({ "spec": { "arn": "bucket" } })).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
