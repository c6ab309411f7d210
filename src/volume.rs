//! Provisioning request and persistent volume shapes exchanged with the host.
//!
//! Only the fields the provisioner reads or writes are modelled. Capacity,
//! access modes and reclaim policy are copied through untouched.

use serde::{Deserialize, Serialize};

use crate::annotations::Annotations;

/// Input to a provisioning call.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisionRequest {
    /// Name the created volume will carry.
    pub volume_name: String,
    /// Name of the claim being served.
    pub claim_name: String,
    /// Namespace of the claim; also the namespace of its credential secret.
    pub claim_namespace: String,
    /// Claim annotations.
    pub claim_annotations: Annotations,
    /// Storage-class parameters.
    pub class_parameters: Annotations,
    /// Requested capacity, for example `"10Gi"`.
    pub capacity: String,
    /// Requested access modes.
    pub access_modes: Vec<String>,
    /// Reclaim policy inherited from the class.
    pub reclaim_policy: String,
}

impl ProvisionRequest {
    /// Creates a request for `claim_name` in `claim_namespace`.
    #[must_use]
    pub fn new(
        volume_name: impl Into<String>,
        claim_name: impl Into<String>,
        claim_namespace: impl Into<String>,
    ) -> Self {
        Self {
            volume_name: volume_name.into(),
            claim_name: claim_name.into(),
            claim_namespace: claim_namespace.into(),
            ..Self::default()
        }
    }

    /// Sets the claim annotations.
    #[must_use]
    pub fn with_claim_annotations(mut self, annotations: Annotations) -> Self {
        self.claim_annotations = annotations;
        self
    }

    /// Sets the storage-class parameters.
    #[must_use]
    pub fn with_class_parameters(mut self, parameters: Annotations) -> Self {
        self.class_parameters = parameters;
        self
    }
}

/// Name of the secret handed to the mount driver.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SecretReference {
    /// Secret name.
    pub name: String,
}

/// Mount-driver source of a volume.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlexVolumeSource {
    /// Mount driver name.
    pub driver: String,
    /// Filesystem type; always empty for this driver.
    pub fs_type: String,
    /// Credential secret passed to the driver.
    pub secret_ref: SecretReference,
    /// Whether the mount is read-only.
    pub read_only: bool,
    /// Driver tuning options.
    pub options: Annotations,
}

/// Volume produced by provisioning and consumed by teardown.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentVolume {
    /// Volume name.
    pub name: String,
    /// Persisted descriptor annotations.
    pub annotations: Annotations,
    /// Capacity copied from the request.
    pub capacity: String,
    /// Access modes copied from the request.
    pub access_modes: Vec<String>,
    /// Reclaim policy copied from the request.
    pub reclaim_policy: String,
    /// Mount-driver source.
    pub flex_volume: FlexVolumeSource,
}
