//! Provisioning core for s3fs-backed object-storage volumes.
//!
//! A claim's annotations are merged with its storage-class parameters,
//! checked against the bucket policy, and turned into a persistent volume
//! whose annotations carry everything teardown needs. Bucket creation,
//! access checks and deletion go through the [`backend`] traits, which hosts
//! implement for their object store and secret store.

pub mod annotations;
pub mod backend;
pub mod config;
pub mod credentials;
pub mod descriptor;
pub mod error;
pub mod lifecycle;
pub mod naming;
pub mod plan;
pub mod policy;
pub mod provisioner;
pub mod resolver;
pub mod test_support;
pub mod volume;

/// Tracing target for provisioning workflow events.
pub const TRACING_TARGET_PROVISION: &str = "s3fs_provisioner::provision";
/// Tracing target for teardown workflow events.
pub const TRACING_TARGET_TEARDOWN: &str = "s3fs_provisioner::teardown";
/// Tracing target for credential lookups.
pub const TRACING_TARGET_CREDENTIALS: &str = "s3fs_provisioner::credentials";
/// Tracing target for bucket operations.
pub const TRACING_TARGET_BUCKETS: &str = "s3fs_provisioner::buckets";

pub use annotations::{Annotations, ClaimRequest, ClassParameters};
pub use backend::{BackendFuture, ObjectStorageSession, SecretData, SecretStore, SessionFactory};
pub use config::{ConfigError, ProvisionerConfig};
pub use credentials::{CredentialKind, CredentialResolver, ObjectStorageCredentials, SecretRef};
pub use descriptor::{MountOptions, TeardownTarget, VolumeDescriptor};
pub use error::{
    BucketOperation, CredentialError, ErrorKind, ProvisionerError, Stage, WorkflowError,
};
pub use lifecycle::BucketLifecycle;
pub use naming::{TokenError, TokenGenerator, UuidTokenGenerator};
pub use plan::{PlanReport, ProvisionPlan, TeardownReport};
pub use policy::BucketSpec;
pub use provisioner::{Provisioner, S3fsProvisioner};
pub use resolver::ResolvedConfig;
pub use volume::{FlexVolumeSource, PersistentVolume, ProvisionRequest, SecretReference};
