//! Annotation and storage-class parameter keys and their typed views.
//!
//! The key names form a contract with cluster operators and must stay
//! stable. Values always arrive as strings; this module turns them into
//! [`ClaimRequest`] and [`ClassParameters`] one field at a time so each parse
//! failure names the offending key.

use std::collections::BTreeMap;

use crate::error::ProvisionerError;

/// String map used for claim annotations, class parameters, volume
/// annotations and mount options.
pub type Annotations = BTreeMap<String, String>;

/// Annotation and parameter keys.
pub mod keys {
    /// Claim flag: the provisioner creates the bucket.
    pub const AUTO_CREATE_BUCKET: &str = "ibm.io/auto-create-bucket";
    /// Claim flag: the provisioner deletes the bucket with the volume.
    pub const AUTO_DELETE_BUCKET: &str = "ibm.io/auto-delete-bucket";
    /// Claim bucket name.
    pub const BUCKET: &str = "ibm.io/bucket";
    /// Claim object path inside an existing bucket.
    pub const OBJECT_PATH: &str = "ibm.io/object-path";
    /// Claim endpoint override (deprecated in favour of the class value).
    pub const ENDPOINT: &str = "ibm.io/endpoint";
    /// Claim region override (deprecated in favour of the class value).
    pub const REGION: &str = "ibm.io/region";
    /// Name of the credential secret.
    pub const SECRET_NAME: &str = "ibm.io/secret-name";
    /// Namespace of the credential secret; only present on volumes.
    pub const SECRET_NAMESPACE: &str = "ibm.io/secret-namespace";
    /// Multipart chunk size in megabytes.
    pub const CHUNK_SIZE_MB: &str = "ibm.io/chunk-size-mb";
    /// Parallel request count.
    pub const PARALLEL_COUNT: &str = "ibm.io/parallel-count";
    /// Maximum parallel requests per multipart operation.
    pub const MULTIREQ_MAX: &str = "ibm.io/multireq-max";
    /// Stat cache entry count.
    pub const STAT_CACHE_SIZE: &str = "ibm.io/stat-cache-size";
    /// Retry count handed to the mount driver.
    pub const S3FS_FUSE_RETRY_COUNT: &str = "ibm.io/s3fs-fuse-retry-count";
    /// Stat cache expiry in seconds; claim only.
    pub const STAT_CACHE_EXPIRE_SECONDS: &str = "ibm.io/stat-cache-expire-seconds";
    /// IAM token endpoint.
    pub const IAM_ENDPOINT: &str = "ibm.io/iam-endpoint";
    /// Set to `"no"` to skip the bucket access check.
    pub const VALIDATE_BUCKET: &str = "ibm.io/validate-bucket";
    /// Class TLS cipher suite.
    pub const TLS_CIPHER_SUITE: &str = "ibm.io/tls-cipher-suite";
    /// Class debug level.
    pub const DEBUG_LEVEL: &str = "ibm.io/debug-level";
    /// Class flag enabling curl debugging.
    pub const CURL_DEBUG: &str = "ibm.io/curl-debug";
    /// Class flag enabling the kernel cache.
    pub const KERNEL_CACHE: &str = "ibm.io/kernel-cache";
    /// Class object-store endpoint.
    pub const OBJECT_STORE_ENDPOINT: &str = "ibm.io/object-store-endpoint";
    /// Class object-store storage class (region).
    pub const OBJECT_STORE_STORAGE_CLASS: &str = "ibm.io/object-store-storage-class";
}

/// Value of `ibm.io/validate-bucket` that disables the access check.
pub const VALIDATE_BUCKET_DISABLED: &str = "no";

/// Parses a boolean annotation value:
/// `1`, `t`, `T`, `TRUE`, `true`, `True` and their false counterparts.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Renders a boolean the way the descriptor stores it.
#[must_use]
pub const fn format_bool(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

pub(crate) fn text(map: &Annotations, key: &str) -> String {
    map.get(key).cloned().unwrap_or_default()
}

pub(crate) fn flag(map: &Annotations, key: &str) -> Result<bool, ProvisionerError> {
    match map.get(key).map(String::as_str) {
        None | Some("") => Ok(false),
        Some(value) => parse_bool(value).ok_or_else(|| {
            ProvisionerError::config_parse(key, format!("invalid boolean value {value:?}"))
        }),
    }
}

pub(crate) fn integer(map: &Annotations, key: &str) -> Result<i64, ProvisionerError> {
    match map.get(key).map(String::as_str) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<i64>()
            .map_err(|err| ProvisionerError::config_parse(key, err)),
    }
}

fn insert_non_empty(map: &mut Annotations, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_owned(), value.to_owned());
    }
}

/// Configuration declared on a volume claim.
///
/// Empty strings mean "not set". Numeric overrides stay as strings here; the
/// resolver parses them when merging with the class.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClaimRequest {
    /// Whether the provisioner should create the bucket.
    pub auto_create_bucket: bool,
    /// Whether the provisioner should delete the bucket on teardown.
    pub auto_delete_bucket: bool,
    /// Bucket name.
    pub bucket: String,
    /// Object path inside an existing bucket.
    pub object_path: String,
    /// Endpoint override.
    pub endpoint: String,
    /// Region (storage class) override.
    pub region: String,
    /// Credential secret name.
    pub secret_name: String,
    /// Chunk size override.
    pub chunk_size_mb: String,
    /// Parallel count override.
    pub parallel_count: String,
    /// Multireq max override.
    pub multireq_max: String,
    /// Stat cache size override.
    pub stat_cache_size: String,
    /// Retry count override.
    pub s3fs_fuse_retry_count: String,
    /// Stat cache expiry in seconds.
    pub stat_cache_expire_seconds: String,
    /// IAM endpoint override.
    pub iam_endpoint: String,
    /// Access-check switch; only `"no"` is recognised.
    pub validate_bucket: String,
}

impl ClaimRequest {
    /// Reads a claim from its annotations. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::ConfigParse`] when a flag annotation holds
    /// something other than a boolean.
    pub fn from_annotations(map: &Annotations) -> Result<Self, ProvisionerError> {
        Ok(Self {
            auto_create_bucket: flag(map, keys::AUTO_CREATE_BUCKET)?,
            auto_delete_bucket: flag(map, keys::AUTO_DELETE_BUCKET)?,
            bucket: text(map, keys::BUCKET),
            object_path: text(map, keys::OBJECT_PATH),
            endpoint: text(map, keys::ENDPOINT),
            region: text(map, keys::REGION),
            secret_name: text(map, keys::SECRET_NAME),
            chunk_size_mb: text(map, keys::CHUNK_SIZE_MB),
            parallel_count: text(map, keys::PARALLEL_COUNT),
            multireq_max: text(map, keys::MULTIREQ_MAX),
            stat_cache_size: text(map, keys::STAT_CACHE_SIZE),
            s3fs_fuse_retry_count: text(map, keys::S3FS_FUSE_RETRY_COUNT),
            stat_cache_expire_seconds: text(map, keys::STAT_CACHE_EXPIRE_SECONDS),
            iam_endpoint: text(map, keys::IAM_ENDPOINT),
            validate_bucket: text(map, keys::VALIDATE_BUCKET),
        })
    }

    /// Renders the claim back into annotations.
    ///
    /// Flags, the bucket and the secret name are always written; every other
    /// field is written only when non-empty.
    #[must_use]
    pub fn to_annotations(&self) -> Annotations {
        let mut map = Annotations::new();
        map.insert(
            keys::AUTO_CREATE_BUCKET.to_owned(),
            format_bool(self.auto_create_bucket).to_owned(),
        );
        map.insert(
            keys::AUTO_DELETE_BUCKET.to_owned(),
            format_bool(self.auto_delete_bucket).to_owned(),
        );
        map.insert(keys::BUCKET.to_owned(), self.bucket.clone());
        map.insert(keys::SECRET_NAME.to_owned(), self.secret_name.clone());
        for (key, value) in [
            (keys::OBJECT_PATH, &self.object_path),
            (keys::ENDPOINT, &self.endpoint),
            (keys::REGION, &self.region),
            (keys::CHUNK_SIZE_MB, &self.chunk_size_mb),
            (keys::PARALLEL_COUNT, &self.parallel_count),
            (keys::MULTIREQ_MAX, &self.multireq_max),
            (keys::STAT_CACHE_SIZE, &self.stat_cache_size),
            (keys::S3FS_FUSE_RETRY_COUNT, &self.s3fs_fuse_retry_count),
            (keys::STAT_CACHE_EXPIRE_SECONDS, &self.stat_cache_expire_seconds),
            (keys::IAM_ENDPOINT, &self.iam_endpoint),
            (keys::VALIDATE_BUCKET, &self.validate_bucket),
        ] {
            insert_non_empty(&mut map, key, value);
        }
        map
    }

    /// Returns `true` when the claim explicitly opted out of the access check.
    #[must_use]
    pub fn validation_disabled(&self) -> bool {
        self.validate_bucket == VALIDATE_BUCKET_DISABLED
    }
}

/// Configuration declared on a storage class.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClassParameters {
    /// Multipart chunk size in megabytes.
    pub chunk_size_mb: i64,
    /// Parallel request count.
    pub parallel_count: i64,
    /// Maximum parallel requests per multipart operation.
    pub multireq_max: i64,
    /// Stat cache entry count.
    pub stat_cache_size: i64,
    /// Retry count handed to the mount driver.
    pub s3fs_fuse_retry_count: i64,
    /// TLS cipher suite.
    pub tls_cipher_suite: String,
    /// Mount driver debug level.
    pub debug_level: String,
    /// IAM token endpoint.
    pub iam_endpoint: String,
    /// Object-store endpoint.
    pub object_store_endpoint: String,
    /// Object-store storage class (region).
    pub object_store_storage_class: String,
    /// Whether curl debugging is enabled.
    pub curl_debug: bool,
    /// Whether the kernel cache is enabled.
    pub kernel_cache: bool,
}

impl ClassParameters {
    /// Reads class parameters. Absent integers default to zero and absent
    /// flags to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionerError::ConfigParse`] naming the parameter when an
    /// integer or flag is malformed.
    pub fn from_parameters(map: &Annotations) -> Result<Self, ProvisionerError> {
        Ok(Self {
            chunk_size_mb: integer(map, keys::CHUNK_SIZE_MB)?,
            parallel_count: integer(map, keys::PARALLEL_COUNT)?,
            multireq_max: integer(map, keys::MULTIREQ_MAX)?,
            stat_cache_size: integer(map, keys::STAT_CACHE_SIZE)?,
            s3fs_fuse_retry_count: integer(map, keys::S3FS_FUSE_RETRY_COUNT)?,
            tls_cipher_suite: text(map, keys::TLS_CIPHER_SUITE),
            debug_level: text(map, keys::DEBUG_LEVEL),
            iam_endpoint: text(map, keys::IAM_ENDPOINT),
            object_store_endpoint: text(map, keys::OBJECT_STORE_ENDPOINT),
            object_store_storage_class: text(map, keys::OBJECT_STORE_STORAGE_CLASS),
            curl_debug: flag(map, keys::CURL_DEBUG)?,
            kernel_cache: flag(map, keys::KERNEL_CACHE)?,
        })
    }
}
