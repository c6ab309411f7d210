//! Provisioning and teardown workflows.
//!
//! A call runs its stages in order and stops at the first failure. Each call
//! owns its session; nothing is shared between calls apart from the
//! collaborators held by [`S3fsProvisioner`].

use tracing::{debug, info};

use crate::backend::{BackendFuture, SecretStore, SessionFactory};
use crate::config::ProvisionerConfig;
use crate::credentials::CredentialResolver;
use crate::error::{Stage, WorkflowError, at};
use crate::lifecycle::BucketLifecycle;
use crate::naming::TokenGenerator;
use crate::plan::{ProvisionPlan, read_descriptor};
use crate::volume::{PersistentVolume, ProvisionRequest};
use crate::{TRACING_TARGET_PROVISION, TRACING_TARGET_TEARDOWN};

/// Host-facing provisioning interface.
pub trait Provisioner: Send + Sync {
    /// Serves a claim, returning the volume to persist.
    fn provision<'a>(
        &'a self,
        request: &'a ProvisionRequest,
    ) -> BackendFuture<'a, PersistentVolume, WorkflowError>;

    /// Tears down a volume previously returned by [`Provisioner::provision`].
    fn delete<'a>(&'a self, volume: &'a PersistentVolume) -> BackendFuture<'a, (), WorkflowError>;
}

/// Provisioner for s3fs-backed volumes.
#[derive(Debug)]
pub struct S3fsProvisioner<S, F, G> {
    driver_name: String,
    cluster_id: String,
    secrets: S,
    sessions: F,
    tokens: G,
}

impl<S, F, G> S3fsProvisioner<S, F, G>
where
    S: SecretStore,
    F: SessionFactory,
    G: TokenGenerator,
{
    /// Creates a provisioner from its configuration and collaborators.
    #[must_use]
    pub fn new(config: &ProvisionerConfig, secrets: S, sessions: F, tokens: G) -> Self {
        Self {
            driver_name: config.driver_name.clone(),
            cluster_id: config.cluster_id(),
            secrets,
            sessions,
            tokens,
        }
    }

    async fn provision_volume(
        &self,
        request: &ProvisionRequest,
    ) -> Result<PersistentVolume, WorkflowError> {
        let subject = request.claim_name.as_str();
        info!(
            target: TRACING_TARGET_PROVISION,
            cluster_id = %self.cluster_id,
            claim = %subject,
            namespace = %request.claim_namespace,
            volume = %request.volume_name,
            "provisioning volume"
        );
        let plan = ProvisionPlan::prepare(request, &self.tokens)?;

        if plan.bucket.requires_session() {
            debug!(
                target: TRACING_TARGET_PROVISION,
                claim = %subject,
                stage = %Stage::CredentialResolution,
                "stage started"
            );
            let credentials = CredentialResolver::new(&self.secrets)
                .resolve(&plan.secret, &plan.config.iam_endpoint)
                .await
                .map_err(at(subject, Stage::CredentialResolution))?;

            debug!(
                target: TRACING_TARGET_PROVISION,
                claim = %subject,
                stage = %Stage::LifecycleExecution,
                bucket = %plan.bucket.name,
                "stage started"
            );
            let session =
                self.sessions
                    .new_session(&plan.config.endpoint, &plan.config.region, &credentials);
            BucketLifecycle::new(&session)
                .execute(&plan.bucket, &credentials)
                .await
                .map_err(at(subject, Stage::LifecycleExecution))?;
        }

        debug!(
            target: TRACING_TARGET_PROVISION,
            claim = %subject,
            stage = %Stage::DescriptorBuilding,
            "stage started"
        );
        let volume = plan.persistent_volume(request, &self.driver_name);
        info!(
            target: TRACING_TARGET_PROVISION,
            cluster_id = %self.cluster_id,
            claim = %subject,
            bucket = %plan.bucket.name,
            "volume provisioned"
        );
        Ok(volume)
    }

    async fn delete_volume(&self, volume: &PersistentVolume) -> Result<(), WorkflowError> {
        let subject = volume.name.as_str();
        info!(
            target: TRACING_TARGET_TEARDOWN,
            cluster_id = %self.cluster_id,
            volume = %subject,
            "deleting volume"
        );
        let target = read_descriptor(subject, &volume.annotations)?.teardown_target();
        if !target.auto_delete_bucket {
            debug!(
                target: TRACING_TARGET_TEARDOWN,
                volume = %subject,
                bucket = %target.bucket,
                "bucket retained"
            );
            return Ok(());
        }

        debug!(
            target: TRACING_TARGET_TEARDOWN,
            volume = %subject,
            stage = %Stage::CredentialResolution,
            "stage started"
        );
        let credentials = CredentialResolver::new(&self.secrets)
            .resolve(&target.secret, &target.iam_endpoint)
            .await
            .map_err(at(subject, Stage::CredentialResolution))?;

        debug!(
            target: TRACING_TARGET_TEARDOWN,
            volume = %subject,
            stage = %Stage::BucketDelete,
            "stage started"
        );
        let session = self
            .sessions
            .new_session(&target.endpoint, &target.region, &credentials);
        BucketLifecycle::new(&session)
            .delete(&target.bucket)
            .await
            .map_err(at(subject, Stage::BucketDelete))
    }
}

impl<S, F, G> Provisioner for S3fsProvisioner<S, F, G>
where
    S: SecretStore,
    F: SessionFactory,
    G: TokenGenerator,
{
    fn provision<'a>(
        &'a self,
        request: &'a ProvisionRequest,
    ) -> BackendFuture<'a, PersistentVolume, WorkflowError> {
        Box::pin(self.provision_volume(request))
    }

    fn delete<'a>(&'a self, volume: &'a PersistentVolume) -> BackendFuture<'a, (), WorkflowError> {
        Box::pin(self.delete_volume(volume))
    }
}
