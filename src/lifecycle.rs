//! Ordered bucket operations against a single backend session.
//!
//! Steps run create → access check → object-path check and stop at the first
//! failure. Nothing is retried and a bucket created earlier in the call is
//! left in place when a later step fails.

use tracing::{debug, info, warn};

use crate::TRACING_TARGET_BUCKETS;
use crate::backend::ObjectStorageSession;
use crate::credentials::ObjectStorageCredentials;
use crate::error::{BucketOperation, ProvisionerError};
use crate::policy::BucketSpec;

/// Runs lifecycle steps over one session.
#[derive(Debug)]
pub struct BucketLifecycle<'a, T> {
    session: &'a T,
}

impl<'a, T: ObjectStorageSession> BucketLifecycle<'a, T> {
    /// Wraps a session opened for the current call.
    #[must_use]
    pub const fn new(session: &'a T) -> Self {
        Self { session }
    }

    /// Executes the steps required by `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::Validation`] when API-key credentials lack
    /// a service instance id for creation or the object path is missing, and
    /// [`ProvisionerError::Backend`] when a backend call fails.
    pub async fn execute(
        &self,
        spec: &BucketSpec,
        credentials: &ObjectStorageCredentials,
    ) -> Result<(), ProvisionerError> {
        if spec.create {
            self.create(&spec.name, credentials).await?;
        }
        if spec.validate_access {
            self.check_access(&spec.name).await?;
        }
        if let Some(object_path) = &spec.object_path {
            self.check_object_path(&spec.name, object_path).await?;
        }
        Ok(())
    }

    async fn create(
        &self,
        bucket: &str,
        credentials: &ObjectStorageCredentials,
    ) -> Result<(), ProvisionerError> {
        if credentials.api_key_without_service_instance() {
            return Err(ProvisionerError::validation(
                "cannot create bucket using API key without service-instance-id",
            ));
        }
        debug!(target: TRACING_TARGET_BUCKETS, bucket = %bucket, "creating bucket");
        let message = self
            .session
            .create_bucket(bucket)
            .await
            .map_err(|err| backend_error(BucketOperation::Create, bucket, err))?;
        if let Some(note) = message.filter(|note| !note.is_empty()) {
            info!(target: TRACING_TARGET_BUCKETS, bucket = %bucket, "{note}");
        }
        Ok(())
    }

    async fn check_access(&self, bucket: &str) -> Result<(), ProvisionerError> {
        debug!(target: TRACING_TARGET_BUCKETS, bucket = %bucket, "checking bucket access");
        self.session
            .check_bucket_access(bucket)
            .await
            .map_err(|err| backend_error(BucketOperation::CheckAccess, bucket, err))
    }

    async fn check_object_path(
        &self,
        bucket: &str,
        object_path: &str,
    ) -> Result<(), ProvisionerError> {
        debug!(
            target: TRACING_TARGET_BUCKETS,
            bucket = %bucket,
            object_path = %object_path,
            "checking object-path existence"
        );
        let exists = self
            .session
            .check_object_path_existence(bucket, object_path)
            .await
            .map_err(|err| backend_error(BucketOperation::CheckObjectPath, bucket, err))?;
        if exists {
            return Ok(());
        }
        Err(ProvisionerError::validation(format!(
            "object-path {object_path:?} not found inside bucket {bucket}"
        )))
    }

    /// Deletes `bucket` during teardown.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::Backend`] when the backend refuses.
    pub async fn delete(&self, bucket: &str) -> Result<(), ProvisionerError> {
        info!(target: TRACING_TARGET_BUCKETS, bucket = %bucket, "deleting bucket");
        self.session.delete_bucket(bucket).await.map_err(|err| {
            warn!(
                target: TRACING_TARGET_BUCKETS,
                bucket = %bucket,
                error = %err,
                "bucket delete failed"
            );
            backend_error(BucketOperation::Delete, bucket, err)
        })
    }
}

fn backend_error<E>(operation: BucketOperation, bucket: &str, err: E) -> ProvisionerError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ProvisionerError::Backend {
        operation,
        bucket: bucket.to_owned(),
        source: Box::new(err),
    }
}
