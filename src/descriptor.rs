//! Persisted volume descriptor and mount-driver options.
//!
//! The descriptor is written onto the volume at provisioning time and is the
//! only input teardown gets. It therefore stores the resolved endpoint,
//! region and IAM endpoint, not the raw claim overrides, along with the
//! namespace of the credential secret.

use crate::annotations::{Annotations, ClaimRequest, format_bool, keys};
use crate::credentials::SecretRef;
use crate::error::ProvisionerError;
use crate::policy::BucketSpec;
use crate::resolver::ResolvedConfig;

/// Claim state persisted on a provisioned volume.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VolumeDescriptor {
    /// Claim fields after bucket naming and endpoint resolution.
    pub claim: ClaimRequest,
    /// Namespace holding the credential secret.
    pub secret_namespace: String,
}

/// Everything teardown needs, recovered from a [`VolumeDescriptor`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TeardownTarget {
    /// Credential secret reference.
    pub secret: SecretRef,
    /// Bucket backing the volume.
    pub bucket: String,
    /// Whether the bucket is deleted with the volume.
    pub auto_delete_bucket: bool,
    /// Object-store endpoint.
    pub endpoint: String,
    /// Object-store storage class (region).
    pub region: String,
    /// IAM endpoint.
    pub iam_endpoint: String,
}

impl VolumeDescriptor {
    /// Builds a descriptor for `bucket`, replacing the claim's endpoint
    /// overrides with the values that were actually used.
    #[must_use]
    pub fn new(
        claim: &ClaimRequest,
        bucket: &BucketSpec,
        config: &ResolvedConfig,
        secret_namespace: impl Into<String>,
    ) -> Self {
        Self {
            claim: ClaimRequest {
                bucket: bucket.name.clone(),
                endpoint: config.endpoint.clone(),
                region: config.region.clone(),
                iam_endpoint: config.iam_endpoint.clone(),
                ..claim.clone()
            },
            secret_namespace: secret_namespace.into(),
        }
    }

    /// Renders the descriptor as volume annotations.
    #[must_use]
    pub fn to_annotations(&self) -> Annotations {
        let mut map = self.claim.to_annotations();
        map.insert(
            keys::SECRET_NAMESPACE.to_owned(),
            self.secret_namespace.clone(),
        );
        map
    }

    /// Reads a descriptor back from volume annotations.
    ///
    /// A missing secret namespace is read as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::Marshal`] when a persisted flag is not a
    /// boolean.
    pub fn from_annotations(map: &Annotations) -> Result<Self, ProvisionerError> {
        let claim = ClaimRequest::from_annotations(map)
            .map_err(|err| ProvisionerError::Marshal(err.to_string()))?;
        Ok(Self {
            claim,
            secret_namespace: map.get(keys::SECRET_NAMESPACE).cloned().unwrap_or_default(),
        })
    }

    /// Extracts the teardown tuple.
    #[must_use]
    pub fn teardown_target(&self) -> TeardownTarget {
        TeardownTarget {
            secret: SecretRef::new(
                self.claim.secret_name.clone(),
                self.secret_namespace.clone(),
            ),
            bucket: self.claim.bucket.clone(),
            auto_delete_bucket: self.claim.auto_delete_bucket,
            endpoint: self.claim.endpoint.clone(),
            region: self.claim.region.clone(),
            iam_endpoint: self.claim.iam_endpoint.clone(),
        }
    }
}

/// Option keys understood by the mount driver.
pub mod option_keys {
    /// Multipart chunk size in megabytes.
    pub const CHUNK_SIZE_MB: &str = "chunk-size-mb";
    /// Parallel request count.
    pub const PARALLEL_COUNT: &str = "parallel-count";
    /// Maximum parallel requests per multipart operation.
    pub const MULTIREQ_MAX: &str = "multireq-max";
    /// Stat cache entry count.
    pub const STAT_CACHE_SIZE: &str = "stat-cache-size";
    /// TLS cipher suite.
    pub const TLS_CIPHER_SUITE: &str = "tls-cipher-suite";
    /// Curl debugging switch.
    pub const CURL_DEBUG: &str = "curl-debug";
    /// Kernel cache switch.
    pub const KERNEL_CACHE: &str = "kernel-cache";
    /// Driver debug level.
    pub const DEBUG_LEVEL: &str = "debug-level";
    /// Retry count.
    pub const S3FS_FUSE_RETRY_COUNT: &str = "s3fs-fuse-retry-count";
    /// Stat cache expiry in seconds.
    pub const STAT_CACHE_EXPIRE_SECONDS: &str = "stat-cache-expire-seconds";
    /// IAM endpoint.
    pub const IAM_ENDPOINT: &str = "iam-endpoint";
    /// Object-store endpoint.
    pub const OBJECT_STORE_ENDPOINT: &str = "object-store-endpoint";
    /// Object-store storage class.
    pub const OBJECT_STORE_STORAGE_CLASS: &str = "object-store-storage-class";
    /// Bucket name.
    pub const BUCKET: &str = "bucket";
    /// Object path inside the bucket.
    pub const OBJECT_PATH: &str = "object-path";
}

/// Tuning handed to the mount driver. Never read back by teardown.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MountOptions {
    config: ResolvedConfig,
    bucket: String,
    object_path: Option<String>,
}

impl MountOptions {
    /// Captures the resolved tuning for `bucket`.
    #[must_use]
    pub fn new(config: &ResolvedConfig, bucket: &BucketSpec) -> Self {
        Self {
            config: config.clone(),
            bucket: bucket.name.clone(),
            object_path: bucket.object_path.clone(),
        }
    }

    /// Renders the option map. Integers are decimal strings; empty strings
    /// are left out.
    #[must_use]
    pub fn to_options(&self) -> Annotations {
        let config = &self.config;
        let mut options = Annotations::new();
        for (key, value) in [
            (option_keys::CHUNK_SIZE_MB, config.chunk_size_mb),
            (option_keys::PARALLEL_COUNT, config.parallel_count),
            (option_keys::MULTIREQ_MAX, config.multireq_max),
            (option_keys::STAT_CACHE_SIZE, config.stat_cache_size),
            (option_keys::S3FS_FUSE_RETRY_COUNT, config.s3fs_fuse_retry_count),
        ] {
            options.insert(key.to_owned(), value.to_string());
        }
        for (key, value) in [
            (option_keys::CURL_DEBUG, config.curl_debug),
            (option_keys::KERNEL_CACHE, config.kernel_cache),
        ] {
            options.insert(key.to_owned(), format_bool(value).to_owned());
        }
        for (key, value) in [
            (option_keys::TLS_CIPHER_SUITE, config.tls_cipher_suite.as_str()),
            (option_keys::DEBUG_LEVEL, config.debug_level.as_str()),
            (
                option_keys::STAT_CACHE_EXPIRE_SECONDS,
                config.stat_cache_expire_seconds.as_str(),
            ),
            (option_keys::IAM_ENDPOINT, config.iam_endpoint.as_str()),
            (option_keys::OBJECT_STORE_ENDPOINT, config.endpoint.as_str()),
            (option_keys::OBJECT_STORE_STORAGE_CLASS, config.region.as_str()),
            (option_keys::BUCKET, self.bucket.as_str()),
            (
                option_keys::OBJECT_PATH,
                self.object_path.as_deref().unwrap_or_default(),
            ),
        ] {
            if !value.is_empty() {
                options.insert(key.to_owned(), value.to_owned());
            }
        }
        options
    }
}
