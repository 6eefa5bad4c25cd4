//! Per-source AWS client construction

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::config::Credentials;
use aws_smithy_types::timeout::TimeoutConfig;
use s3hook_core::config::AwsProviderConfig;
use s3hook_core::secrets::resolve_value;
use s3hook_core::source::{AwsSecurityCredentials, S3Source};
use s3hook_core::traits::{ClientGetter, Clients, SecretStore};
use s3hook_core::{Error, Result};
use std::sync::Arc;
use tracing::debug;

use crate::s3::S3NotificationApi;
use crate::sqs::SqsQueueApi;

/// Name reported by static credentials built from source secrets
const CREDENTIALS_PROVIDER_NAME: &str = "s3hook-source-secret";

/// Builds SQS and S3 clients for a source
///
/// The region is taken from the source's bucket ARN. Credentials are the
/// static keys referenced by the source, or the ambient credential chain
/// (environment, profile, instance role) when the source declares none.
pub struct AwsClientGetter {
    secrets: Arc<dyn SecretStore>,
    config: AwsProviderConfig,
}

impl AwsClientGetter {
    pub fn new(secrets: Arc<dyn SecretStore>, config: AwsProviderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { secrets, config })
    }

    async fn static_credentials(
        &self,
        namespace: &str,
        creds: &AwsSecurityCredentials,
    ) -> Result<Credentials> {
        let access_key_id = resolve_value(self.secrets.as_ref(), namespace, &creds.access_key_id).await?;
        let secret_access_key =
            resolve_value(self.secrets.as_ref(), namespace, &creds.secret_access_key).await?;

        Ok(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        ))
    }
}

/// Region the source's APIs must be reached in
fn source_region(src: &S3Source) -> Result<String> {
    let region = &src.spec.arn.region;
    if region.is_empty() {
        return Err(Error::client_construction(format!(
            "bucket ARN {} does not include a region",
            src.spec.arn
        )));
    }
    Ok(region.clone())
}

#[async_trait]
impl ClientGetter for AwsClientGetter {
    async fn get(&self, src: &S3Source) -> Result<Clients> {
        let region = source_region(src)?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.config.operation_timeout())
                    .build(),
            );

        if let Some(creds) = src.spec.auth.as_ref().and_then(|a| a.credentials.as_ref()) {
            let credentials = self
                .static_credentials(&src.metadata.namespace, creds)
                .await?;
            loader = loader.credentials_provider(credentials);
        }

        if let Some(endpoint) = &self.config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        // Custom endpoints (e.g. LocalStack) rarely support virtual-hosted buckets
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(self.config.endpoint_url.is_some())
            .build();

        debug!(source = %src.source_id(), region = %region, "Created AWS API clients");

        Ok(Clients {
            queues: Arc::new(SqsQueueApi::new(aws_sdk_sqs::Client::new(&sdk_config))),
            notifications: Arc::new(S3NotificationApi::new(aws_sdk_s3::Client::from_conf(
                s3_config,
            ))),
        })
    }
}
