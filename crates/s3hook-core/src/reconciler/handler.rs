use async_trait::async_trait;

use crate::error::Result;
use crate::hook::HookResponse;
use crate::reconciler::SubscriptionReconciler;
use crate::registry::{GroupVersionKind, GroupVersionResource, Handler, ManagedObject};
use crate::source::{AWS_S3_SOURCE_KIND, AWS_S3_SOURCE_RESOURCE, SOURCES_GROUP, SOURCES_VERSION};

/// Handler of `AWSS3Source` objects
pub struct S3SourceHandler {
    reconciler: SubscriptionReconciler,
}

impl S3SourceHandler {
    pub fn new(reconciler: SubscriptionReconciler) -> Self {
        Self { reconciler }
    }
}

#[async_trait]
impl Handler for S3SourceHandler {
    fn group_version_resource(&self) -> GroupVersionResource {
        GroupVersionResource {
            group: SOURCES_GROUP.to_string(),
            version: SOURCES_VERSION.to_string(),
            resource: AWS_S3_SOURCE_RESOURCE.to_string(),
        }
    }

    fn kind(&self) -> GroupVersionKind {
        GroupVersionKind::new(SOURCES_GROUP, SOURCES_VERSION, AWS_S3_SOURCE_KIND)
    }

    async fn reconcile(&self, object: ManagedObject) -> Result<HookResponse> {
        let ManagedObject::AwsS3Source(mut src) = object;
        let conditions = self.reconciler.reconcile(&mut src).await;
        Ok(HookResponse::new(conditions, src.status.queue_arn))
    }

    async fn finalize(&self, object: ManagedObject) -> Result<HookResponse> {
        let ManagedObject::AwsS3Source(src) = object;
        let conditions = self.reconciler.finalize(&src).await;
        Ok(HookResponse::new(conditions, None))
    }
}
