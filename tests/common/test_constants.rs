//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Namespace the scenarios submit claims from.
pub const CLAIM_NAMESPACE: &str = "apps";

/// Object-store endpoint configured on the storage class.
pub const OBJECT_STORE_ENDPOINT: &str = "https://s3.example.com";

/// Storage class configured on the storage class.
pub const OBJECT_STORE_STORAGE_CLASS: &str = "us-standard";

/// IAM endpoint configured on the storage class.
pub const IAM_ENDPOINT: &str = "https://iam.example.com";
