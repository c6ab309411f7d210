//! Offline portion of provisioning: everything decided before the first
//! credential lookup or backend call.
//!
//! [`ProvisionPlan::prepare`] is shared by the provisioning workflow and the
//! `plan` subcommand, so what the command prints is what the workflow would
//! do.

use serde::Serialize;
use tracing::debug;

use crate::annotations::{Annotations, ClaimRequest, ClassParameters};
use crate::credentials::SecretRef;
use crate::descriptor::{MountOptions, VolumeDescriptor};
use crate::error::{Stage, WorkflowError, at};
use crate::naming::TokenGenerator;
use crate::policy::{self, BucketSpec};
use crate::resolver::{self, ResolvedConfig};
use crate::volume::{FlexVolumeSource, PersistentVolume, ProvisionRequest, SecretReference};
use crate::{TRACING_TARGET_PROVISION, TRACING_TARGET_TEARDOWN};

/// Mount-driver filesystem type; the driver ignores it.
pub const FS_TYPE: &str = "";

/// Resolved and validated provisioning decisions for one request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProvisionPlan {
    /// Claim as read from its annotations.
    pub claim: ClaimRequest,
    /// Configuration after merging claim and class.
    pub config: ResolvedConfig,
    /// Bucket name and lifecycle intents.
    pub bucket: BucketSpec,
    /// Credential secret, looked up in the claim's namespace.
    pub secret: SecretRef,
}

impl ProvisionPlan {
    /// Parses, resolves and validates `request`, then plans its bucket.
    ///
    /// # Errors
    ///
    /// Returns a [`WorkflowError`] at [`Stage::Resolving`] for parse and
    /// merge failures and at [`Stage::Validating`] for policy violations or a
    /// failed bucket name generation.
    pub fn prepare<G>(request: &ProvisionRequest, tokens: &G) -> Result<Self, WorkflowError>
    where
        G: TokenGenerator + ?Sized,
    {
        let subject = request.claim_name.as_str();
        debug!(
            target: TRACING_TARGET_PROVISION,
            claim = %subject,
            stage = %Stage::Resolving,
            "stage started"
        );
        let claim = ClaimRequest::from_annotations(&request.claim_annotations)
            .map_err(at(subject, Stage::Resolving))?;
        let class = ClassParameters::from_parameters(&request.class_parameters)
            .map_err(at(subject, Stage::Resolving))?;
        let config = resolver::resolve(&claim, &class).map_err(at(subject, Stage::Resolving))?;

        debug!(
            target: TRACING_TARGET_PROVISION,
            claim = %subject,
            stage = %Stage::Validating,
            "stage started"
        );
        policy::validate(&claim).map_err(at(subject, Stage::Validating))?;
        let bucket = BucketSpec::plan(&claim, tokens).map_err(at(subject, Stage::Validating))?;

        let secret = SecretRef::new(claim.secret_name.clone(), request.claim_namespace.clone());
        Ok(Self {
            claim,
            config,
            bucket,
            secret,
        })
    }

    /// Descriptor persisted on the volume.
    #[must_use]
    pub fn descriptor(&self) -> VolumeDescriptor {
        VolumeDescriptor::new(&self.claim, &self.bucket, &self.config, &self.secret.namespace)
    }

    /// Options handed to the mount driver.
    #[must_use]
    pub fn mount_options(&self) -> MountOptions {
        MountOptions::new(&self.config, &self.bucket)
    }

    /// Builds the volume returned to the host once the lifecycle succeeded.
    #[must_use]
    pub fn persistent_volume(
        &self,
        request: &ProvisionRequest,
        driver_name: &str,
    ) -> PersistentVolume {
        PersistentVolume {
            name: request.volume_name.clone(),
            annotations: self.descriptor().to_annotations(),
            capacity: request.capacity.clone(),
            access_modes: request.access_modes.clone(),
            reclaim_policy: request.reclaim_policy.clone(),
            flex_volume: FlexVolumeSource {
                driver: driver_name.to_owned(),
                fs_type: FS_TYPE.to_owned(),
                secret_ref: SecretReference {
                    name: self.secret.name.clone(),
                },
                read_only: false,
                options: self.mount_options().to_options(),
            },
        }
    }

    /// Lifecycle steps the workflow would run, in order.
    #[must_use]
    pub fn steps(&self) -> Vec<&'static str> {
        let mut steps = Vec::new();
        if self.bucket.create {
            steps.push("create-bucket");
        }
        if self.bucket.validate_access {
            steps.push("check-bucket-access");
        }
        if self.bucket.object_path.is_some() {
            steps.push("check-object-path");
        }
        steps
    }

    /// Summarises the plan for display.
    #[must_use]
    pub fn report(&self, request: &ProvisionRequest, driver_name: &str) -> PlanReport {
        PlanReport {
            claim: request.claim_name.clone(),
            bucket: self.bucket.name.clone(),
            delete_on_removal: self.bucket.delete_on_removal,
            secret_name: self.secret.name.clone(),
            secret_namespace: self.secret.namespace.clone(),
            endpoint: self.config.endpoint.clone(),
            region: self.config.region.clone(),
            steps: self.steps(),
            volume: self.persistent_volume(request, driver_name),
        }
    }
}

/// Serialisable summary printed by the `plan` subcommand.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    /// Claim name.
    pub claim: String,
    /// Bucket that would back the volume.
    pub bucket: String,
    /// Whether teardown would delete the bucket.
    pub delete_on_removal: bool,
    /// Credential secret name.
    pub secret_name: String,
    /// Credential secret namespace.
    pub secret_namespace: String,
    /// Resolved object-store endpoint.
    pub endpoint: String,
    /// Resolved storage class.
    pub region: String,
    /// Lifecycle steps in execution order.
    pub steps: Vec<&'static str>,
    /// Volume that would be returned on success.
    pub volume: PersistentVolume,
}

/// Serialisable summary printed by the `inspect` subcommand.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeardownReport {
    /// Volume name.
    pub volume: String,
    /// Bucket backing the volume.
    pub bucket: String,
    /// Whether teardown would delete the bucket.
    pub delete_bucket: bool,
    /// Credential secret name.
    pub secret_name: String,
    /// Credential secret namespace.
    pub secret_namespace: String,
    /// Object-store endpoint used for deletion.
    pub endpoint: String,
    /// Storage class used for deletion.
    pub region: String,
    /// IAM endpoint used for deletion.
    pub iam_endpoint: String,
}

impl TeardownReport {
    /// Reads the teardown decision from a persisted volume.
    ///
    /// # Errors
    ///
    /// Returns a [`WorkflowError`] at [`Stage::ParsingDescriptor`] when the
    /// annotations cannot be read.
    pub fn from_volume(volume: &PersistentVolume) -> Result<Self, WorkflowError> {
        let target = read_descriptor(&volume.name, &volume.annotations)?.teardown_target();
        Ok(Self {
            volume: volume.name.clone(),
            bucket: target.bucket,
            delete_bucket: target.auto_delete_bucket,
            secret_name: target.secret.name,
            secret_namespace: target.secret.namespace,
            endpoint: target.endpoint,
            region: target.region,
            iam_endpoint: target.iam_endpoint,
        })
    }
}

pub(crate) fn read_descriptor(
    subject: &str,
    annotations: &Annotations,
) -> Result<VolumeDescriptor, WorkflowError> {
    debug!(
        target: TRACING_TARGET_TEARDOWN,
        volume = %subject,
        stage = %Stage::ParsingDescriptor,
        "stage started"
    );
    VolumeDescriptor::from_annotations(annotations).map_err(at(subject, Stage::ParsingDescriptor))
}
