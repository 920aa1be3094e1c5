// crates/upload-kit-storage/src/client.rs
// ============================================================================
// Module: Object Storage Seam
// Description: Trait and value types shared by every storage backend.
// Purpose: Keep workflows independent of the concrete SDK.
// Dependencies: async-trait, serde
// ============================================================================

//! ## Overview
//! [`ObjectStorage`] is the narrow set of bucket and object operations the
//! provisioning and probing workflows need. Implementations must map backend
//! failures onto [`StorageError`] variants so callers can react to name
//! collisions, missing buckets, and denied access without string matching.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use upload_kit_config::EncryptionMode;

use crate::error::StorageError;

// ============================================================================
// SECTION: Value Types
// ============================================================================

/// Identity of the principal behind the configured credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallerIdentity {
    /// Account identifier.
    pub account: String,
    /// Principal ARN (user or role).
    pub arn: String,
}

/// Bucket lifecycle rule applied during provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecyclePolicy {
    /// Rule identifier.
    pub rule_id: String,
    /// Key prefix the rule applies to (empty for the whole bucket).
    pub prefix: String,
    /// Days after which current objects expire.
    pub expiration_days: i32,
    /// Days after which noncurrent versions expire.
    pub noncurrent_days: i32,
}

/// Default server-side encryption algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionAlgorithm {
    /// AES256 (SSE-S3).
    Aes256,
    /// KMS-managed encryption (SSE-KMS).
    AwsKms,
}

impl EncryptionAlgorithm {
    /// Returns the wire label of the algorithm.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aes256 => "AES256",
            Self::AwsKms => "aws:kms",
        }
    }
}

impl From<EncryptionMode> for EncryptionAlgorithm {
    fn from(value: EncryptionMode) -> Self {
        match value {
            EncryptionMode::Aes256 => Self::Aes256,
            EncryptionMode::AwsKms => Self::AwsKms,
        }
    }
}

/// Bucket hardening settings, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketSetting {
    /// Block all public ACLs and policies.
    PublicAccessBlock,
    /// Enable object versioning.
    Versioning,
    /// Expire old uploads and noncurrent versions.
    Lifecycle,
    /// Enable default server-side encryption.
    Encryption,
}

impl BucketSetting {
    /// All settings in application order.
    pub const ALL: [Self; 4] =
        [Self::PublicAccessBlock, Self::Versioning, Self::Lifecycle, Self::Encryption];

    /// Returns a stable label for logs and JSON output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PublicAccessBlock => "public_access_block",
            Self::Versioning => "versioning",
            Self::Lifecycle => "lifecycle",
            Self::Encryption => "encryption",
        }
    }
}

/// Storage operations, used for logging and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageOperation {
    /// Identity lookup.
    CallerIdentity,
    /// Bucket creation.
    CreateBucket,
    /// Public access block.
    BlockPublicAccess,
    /// Versioning toggle.
    EnableVersioning,
    /// Lifecycle configuration.
    PutLifecycle,
    /// Default encryption.
    EnableEncryption,
    /// Bucket existence/access check.
    HeadBucket,
    /// Object upload.
    PutObject,
    /// Object download.
    GetObject,
    /// Object deletion.
    DeleteObject,
    /// Presigned GET URL generation.
    PresignGet,
}

impl StorageOperation {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CallerIdentity => "get_caller_identity",
            Self::CreateBucket => "create_bucket",
            Self::BlockPublicAccess => "put_public_access_block",
            Self::EnableVersioning => "put_bucket_versioning",
            Self::PutLifecycle => "put_bucket_lifecycle_configuration",
            Self::EnableEncryption => "put_bucket_encryption",
            Self::HeadBucket => "head_bucket",
            Self::PutObject => "put_object",
            Self::GetObject => "get_object",
            Self::DeleteObject => "delete_object",
            Self::PresignGet => "presign_get_object",
        }
    }
}

/// Outcome of a single workflow step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum StepStatus {
    /// Step succeeded.
    Passed,
    /// Step failed with a classified error.
    Failed(StorageError),
    /// Step was not attempted because an earlier step failed.
    Skipped,
}

impl StepStatus {
    /// Returns true when the step passed.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Returns the error when the step failed.
    #[must_use]
    pub const fn error(&self) -> Option<&StorageError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Passed | Self::Skipped => None,
        }
    }
}

impl<T> From<&Result<T, StorageError>> for StepStatus {
    fn from(value: &Result<T, StorageError>) -> Self {
        match value {
            Ok(_) => Self::Passed,
            Err(err) => Self::Failed(err.clone()),
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Bucket and object operations consumed by the Upload Kit workflows.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Region the backend operates in.
    fn region(&self) -> &str;

    /// Returns the identity behind the configured credentials.
    async fn caller_identity(&self) -> Result<CallerIdentity, StorageError>;

    /// Creates a bucket in `region`.
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StorageError>;

    /// Blocks every form of public access on the bucket.
    async fn block_public_access(&self, bucket: &str) -> Result<(), StorageError>;

    /// Enables object versioning.
    async fn enable_versioning(&self, bucket: &str) -> Result<(), StorageError>;

    /// Installs the lifecycle rule.
    async fn put_lifecycle(&self, bucket: &str, policy: &LifecyclePolicy)
    -> Result<(), StorageError>;

    /// Enables default server-side encryption.
    async fn enable_default_encryption(
        &self,
        bucket: &str,
        algorithm: EncryptionAlgorithm,
    ) -> Result<(), StorageError>;

    /// Checks that the bucket exists and is accessible.
    async fn head_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// Writes an object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Reads an object, failing when it exceeds `max_bytes`.
    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        max_bytes: usize,
    ) -> Result<Vec<u8>, StorageError>;

    /// Deletes an object.
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError>;

    /// Generates a presigned GET URL valid for `expires_in`.
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
