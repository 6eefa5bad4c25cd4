//! The AWSS3Source object
//!
//! Desired-state declaration for one bucket notification subscription.
//! Owned by the external controller; the reconciler only writes `status`.

use serde::{Deserialize, Serialize};

use crate::arn::Arn;

/// API group of managed event sources
pub const SOURCES_GROUP: &str = "sources.triggermesh.io";
/// API version of `AWSS3Source`
pub const SOURCES_VERSION: &str = "v1alpha1";
/// Kind of the S3 source object
pub const AWS_S3_SOURCE_KIND: &str = "AWSS3Source";
/// Plural resource name of the S3 source object
pub const AWS_S3_SOURCE_RESOURCE: &str = "awss3sources";

/// Event types subscribed to when a source does not list any
pub const DEFAULT_EVENT_TYPES: &[&str] = &["s3:ObjectCreated:*"];

/// Namespace and name of an object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub namespace: String,
    pub name: String,
}

impl ObjectMeta {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

/// An S3 event source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Source {
    pub metadata: ObjectMeta,
    pub spec: S3SourceSpec,
    #[serde(default)]
    pub status: S3SourceStatus,
}

/// Desired state of an S3 event source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3SourceSpec {
    /// Bucket ARN, including the bucket's region and owner account ID
    pub arn: Arn,

    /// S3 event types to subscribe to
    #[serde(default = "default_event_types")]
    pub event_types: Vec<String>,

    /// User-provided destination of event notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,

    /// Credentials used to reach the AWS APIs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AwsAuth>,
}

fn default_event_types() -> Vec<String> {
    DEFAULT_EVENT_TYPES.iter().map(|s| s.to_string()).collect()
}

/// Destination of event notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sqs: Option<SqsDestination>,
}

/// A queue supplied and managed by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsDestination {
    #[serde(rename = "queueARN", alias = "queueArn")]
    pub queue_arn: Arn,
}

/// Authentication against the AWS APIs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsAuth {
    /// Static security credentials. Absent means the ambient credential chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<AwsSecurityCredentials>,
}

/// Static AWS security credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsSecurityCredentials {
    #[serde(rename = "accessKeyID", alias = "accessKeyId")]
    pub access_key_id: ValueFromField,
    pub secret_access_key: ValueFromField,
}

/// A value given either literally or by reference to a secret key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueFromField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_from_secret: Option<SecretKeySelector>,
}

/// Reference to a key of a secret in the source's namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretKeySelector {
    pub name: String,
    pub key: String,
}

/// Observed state of an S3 event source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3SourceStatus {
    /// ARN of the queue currently backing the subscription
    #[serde(
        default,
        rename = "queueARN",
        alias = "queueArn",
        skip_serializing_if = "Option::is_none"
    )]
    pub queue_arn: Option<Arn>,
}

impl S3Source {
    /// Create a source for the given bucket with default event types
    pub fn new(metadata: ObjectMeta, arn: Arn) -> Self {
        Self {
            metadata,
            spec: S3SourceSpec {
                arn,
                event_types: default_event_types(),
                destination: None,
                auth: None,
            },
            status: S3SourceStatus::default(),
        }
    }

    /// Set a user-provided destination queue
    pub fn with_destination_queue(mut self, queue_arn: Arn) -> Self {
        self.spec.destination = Some(Destination {
            sqs: Some(SqsDestination { queue_arn }),
        });
        self
    }

    /// Set the credentials used to reach the AWS APIs
    pub fn with_auth(mut self, auth: AwsAuth) -> Self {
        self.spec.auth = Some(auth);
        self
    }

    /// The queue supplied by the user, if any.
    ///
    /// Such queues are never created, deleted, or have their policy modified.
    pub fn user_provided_queue(&self) -> Option<&Arn> {
        self.spec
            .destination
            .as_ref()
            .and_then(|d| d.sqs.as_ref())
            .map(|sqs| &sqs.queue_arn)
    }

    /// Identifier of this source instance in AWS resources and resource tags
    pub fn source_id(&self) -> String {
        format!(
            "io.triggermesh.{}.{}.{}",
            AWS_S3_SOURCE_RESOURCE, self.metadata.namespace, self.metadata.name
        )
    }

    /// Name of the bucket observed by this source
    pub fn bucket_name(&self) -> &str {
        &self.spec.arn.resource
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> S3Source {
        S3Source::new(
            ObjectMeta::new("default", "my-source"),
            Arn::new("s3", "us-east-1", "111", "mybucket"),
        )
    }

    #[test]
    fn source_id_is_deterministic() {
        assert_eq!(
            source().source_id(),
            "io.triggermesh.awss3sources.default.my-source"
        );
    }

    #[test]
    fn user_provided_queue() {
        assert!(source().user_provided_queue().is_none());

        let queue = Arn::new("sqs", "us-east-1", "111", "my-queue");
        let src = source().with_destination_queue(queue.clone());
        assert_eq!(src.user_provided_queue(), Some(&queue));
    }

    #[test]
    fn deserialize_defaults_event_types() {
        let src: S3Source = serde_json::from_value(serde_json::json!({
            "metadata": { "namespace": "default", "name": "my-source" },
            "spec": { "arn": "arn:aws:s3:us-east-1:111:mybucket" }
        }))
        .unwrap();

        assert_eq!(src.spec.event_types, vec!["s3:ObjectCreated:*".to_string()]);
        assert_eq!(src.bucket_name(), "mybucket");
        assert_eq!(src.status, S3SourceStatus::default());
    }

    #[test]
    fn deserialize_upstream_field_names() {
        let src: S3Source = serde_json::from_value(serde_json::json!({
            "metadata": { "namespace": "default", "name": "my-source" },
            "spec": {
                "arn": "arn:aws:s3:us-east-1:111:mybucket",
                "destination": {
                    "sqs": { "queueARN": "arn:aws:sqs:us-east-1:111:my-queue" }
                },
                "auth": {
                    "credentials": {
                        "accessKeyID": { "value": "AKIA" },
                        "secretAccessKey": { "value": "s3cr3t" }
                    }
                }
            },
            "status": { "queueARN": "arn:aws:sqs:us-east-1:111:my-queue" }
        }))
        .unwrap();

        let queue = Arn::new("sqs", "us-east-1", "111", "my-queue");
        assert_eq!(src.user_provided_queue(), Some(&queue));
        assert_eq!(src.status.queue_arn, Some(queue));

        let creds = src.spec.auth.unwrap().credentials.unwrap();
        assert_eq!(creds.access_key_id.value.as_deref(), Some("AKIA"));

        let json = serde_json::to_value(source().with_destination_queue(
            Arn::new("sqs", "us-east-1", "111", "my-queue"),
        ))
        .unwrap();
        assert_eq!(
            json["spec"]["destination"]["sqs"]["queueARN"],
            "arn:aws:sqs:us-east-1:111:my-queue"
        );
    }
}
