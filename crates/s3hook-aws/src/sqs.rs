//! Amazon SQS implementation of `QueueApi`

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use aws_sdk_sqs::types::QueueAttributeName;
use s3hook_core::policy::Policy;
use s3hook_core::traits::{QueueApi, QueueAttribute};
use s3hook_core::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

use crate::errors::from_sdk_error;

const PROVIDER: &str = "sqs";

/// SQS queue API
///
/// Every method performs exactly one API request. Retries are left to the
/// SDK's own retry policy.
#[derive(Debug, Clone)]
pub struct SqsQueueApi {
    client: Client,
}

impl SqsQueueApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn attribute_name(attr: QueueAttribute) -> QueueAttributeName {
    match attr {
        QueueAttribute::QueueArn => QueueAttributeName::QueueArn,
        QueueAttribute::Policy => QueueAttributeName::Policy,
    }
}

/// Pick the requested attributes out of a GetQueueAttributes response
fn requested_attributes(
    returned: Option<&HashMap<QueueAttributeName, String>>,
    requested: &[QueueAttribute],
) -> HashMap<QueueAttribute, String> {
    let Some(returned) = returned else {
        return HashMap::new();
    };

    requested
        .iter()
        .filter_map(|attr| {
            returned
                .get(&attribute_name(*attr))
                .map(|value| (*attr, value.clone()))
        })
        .collect()
}

#[async_trait]
impl QueueApi for SqsQueueApi {
    async fn queue_url(&self, queue_name: &str) -> Result<String> {
        let out = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "GetQueueUrl", e))?;

        out.queue_url()
            .map(str::to_string)
            .ok_or_else(|| Error::provider(PROVIDER, "GetQueueUrl returned no queue URL"))
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        tags: &HashMap<String, String>,
    ) -> Result<String> {
        let out = self
            .client
            .create_queue()
            .queue_name(queue_name)
            .set_tags(Some(tags.clone()))
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "CreateQueue", e))?;

        out.queue_url()
            .map(str::to_string)
            .ok_or_else(|| Error::provider(PROVIDER, "CreateQueue returned no queue URL"))
    }

    async fn queue_attributes(
        &self,
        queue_url: &str,
        attributes: &[QueueAttribute],
    ) -> Result<HashMap<QueueAttribute, String>> {
        let names = attributes.iter().map(|attr| attribute_name(*attr)).collect();

        let out = self
            .client
            .get_queue_attributes()
            .queue_url(queue_url)
            .set_attribute_names(Some(names))
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "GetQueueAttributes", e))?;

        Ok(requested_attributes(out.attributes(), attributes))
    }

    async fn set_queue_policy(&self, queue_url: &str, policy: &Policy) -> Result<()> {
        let document = policy.to_json()?;
        debug!(queue_url, policy = %document, "Setting queue policy");

        self.client
            .set_queue_attributes()
            .queue_url(queue_url)
            .attributes(QueueAttributeName::Policy, document)
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "SetQueueAttributes", e))?;

        Ok(())
    }

    async fn queue_tags(&self, queue_url: &str) -> Result<HashMap<String, String>> {
        let out = self
            .client
            .list_queue_tags()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "ListQueueTags", e))?;

        Ok(out.tags().cloned().unwrap_or_default())
    }

    async fn delete_queue(&self, queue_url: &str) -> Result<()> {
        self.client
            .delete_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| from_sdk_error(PROVIDER, "DeleteQueue", e))?;

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
