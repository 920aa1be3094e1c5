// crates/upload-kit-storage/src/memory.rs
// ============================================================================
// Module: In-Memory Storage
// Description: Deterministic `ObjectStorage` backend with failure injection.
// Purpose: Exercise provisioning and probe workflows without a network.
// Dependencies: async-trait
// ============================================================================

//! ## Overview
//! [`InMemoryStorage`] keeps buckets, their hardening settings, and objects in
//! a mutex-guarded map. Names reserved with [`InMemoryStorage::reserve_name`]
//! behave like buckets owned by another account. Failures can be injected per
//! operation, either once ([`InMemoryStorage::fail_next`]) or for every call
//! ([`InMemoryStorage::fail_always`]).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use async_trait::async_trait;

use crate::client::CallerIdentity;
use crate::client::EncryptionAlgorithm;
use crate::client::LifecyclePolicy;
use crate::client::ObjectStorage;
use crate::client::StorageOperation;
use crate::error::StorageError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object bytes.
    pub bytes: Vec<u8>,
    /// Content type supplied on upload.
    pub content_type: Option<String>,
}

/// Snapshot of a bucket and its settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketState {
    /// Region the bucket was created in.
    pub region: String,
    /// Public access block applied.
    pub public_access_blocked: bool,
    /// Versioning enabled.
    pub versioning: bool,
    /// Installed lifecycle policy.
    pub lifecycle: Option<LifecyclePolicy>,
    /// Default encryption algorithm.
    pub encryption: Option<EncryptionAlgorithm>,
    /// Objects by key.
    pub objects: BTreeMap<String, StoredObject>,
}

/// Mutable backend state.
#[derive(Debug, Default)]
struct MemoryState {
    /// Names owned by other accounts.
    foreign: BTreeSet<String>,
    /// Buckets owned by the caller.
    buckets: BTreeMap<String, BucketState>,
    /// One-shot failures, consumed in order.
    queued: BTreeMap<StorageOperation, VecDeque<StorageError>>,
    /// Failures returned on every call.
    persistent: BTreeMap<StorageOperation, StorageError>,
    /// Identity returned by `caller_identity`; `None` means no credentials.
    identity: Option<CallerIdentity>,
    /// Bytes returned by every `get_object` instead of the stored object.
    read_override: Option<Vec<u8>>,
    /// Operations in call order.
    calls: Vec<StorageOperation>,
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// In-process [`ObjectStorage`] used by tests and dry runs.
#[derive(Debug)]
pub struct InMemoryStorage {
    /// Reported region.
    region: String,
    /// Guarded state.
    state: Mutex<MemoryState>,
}

impl InMemoryStorage {
    /// Creates an empty backend with a default identity.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        let state = MemoryState {
            identity: Some(CallerIdentity {
                account: "123456789012".to_string(),
                arn: "arn:aws:iam::123456789012:user/upload-kit".to_string(),
            }),
            ..MemoryState::default()
        };
        Self {
            region: region.into(),
            state: Mutex::new(state),
        }
    }

    /// Replaces the caller identity; `None` simulates missing credentials.
    pub fn set_identity(&self, identity: Option<CallerIdentity>) {
        if let Ok(mut state) = self.state.lock() {
            state.identity = identity;
        }
    }

    /// Marks `name` as a bucket owned by another account.
    pub fn reserve_name(&self, name: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            state.foreign.insert(name.into());
        }
    }

    /// Adds an existing, caller-owned bucket.
    pub fn add_bucket(&self, name: impl Into<String>) {
        if let Ok(mut state) = self.state.lock() {
            let region = self.region.clone();
            state.buckets.entry(name.into()).or_insert_with(|| BucketState {
                region,
                ..BucketState::default()
            });
        }
    }

    /// Fails the next call of `operation` with `error`.
    pub fn fail_next(&self, operation: StorageOperation, error: StorageError) {
        if let Ok(mut state) = self.state.lock() {
            state.queued.entry(operation).or_default().push_back(error);
        }
    }

    /// Fails every call of `operation` with `error`.
    pub fn fail_always(&self, operation: StorageOperation, error: StorageError) {
        if let Ok(mut state) = self.state.lock() {
            state.persistent.insert(operation, error);
        }
    }

    /// Makes every read return `bytes` regardless of what was stored.
    pub fn override_reads(&self, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut state) = self.state.lock() {
            state.read_override = Some(bytes.into());
        }
    }

    /// Returns a snapshot of a caller-owned bucket.
    #[must_use]
    pub fn bucket(&self, name: &str) -> Option<BucketState> {
        self.state.lock().ok().and_then(|state| state.buckets.get(name).cloned())
    }

    /// Returns the names of caller-owned buckets.
    #[must_use]
    pub fn bucket_names(&self) -> Vec<String> {
        self.state.lock().map(|state| state.buckets.keys().cloned().collect()).unwrap_or_default()
    }

    /// Returns the stored bytes of an object.
    #[must_use]
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.bucket(bucket).and_then(|state| state.objects.get(key).map(|obj| obj.bytes.clone()))
    }

    /// Returns the operations invoked so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StorageOperation> {
        self.state.lock().map(|state| state.calls.clone()).unwrap_or_default()
    }

    /// Locks state, records the call, and returns any injected failure.
    fn begin(
        &self,
        operation: StorageOperation,
    ) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        let mut state =
            self.state.lock().map_err(|_| StorageError::io("memory storage lock poisoned"))?;
        state.calls.push(operation);
        if let Some(err) = state.persistent.get(&operation) {
            return Err(err.clone());
        }
        if let Some(err) = state.queued.get_mut(&operation).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(state)
    }

    /// Applies `update` to an existing bucket.
    fn update_bucket(
        &self,
        operation: StorageOperation,
        bucket: &str,
        update: impl FnOnce(&mut BucketState),
    ) -> Result<(), StorageError> {
        let mut state = self.begin(operation)?;
        let entry = state.buckets.get_mut(bucket).ok_or_else(|| not_found(bucket))?;
        update(entry);
        Ok(())
    }
}

/// Builds a bucket-not-found error.
fn not_found(bucket: &str) -> StorageError {
    StorageError::BucketNotFound {
        bucket: bucket.to_string(),
    }
}

#[async_trait]
impl ObjectStorage for InMemoryStorage {
    fn region(&self) -> &str {
        &self.region
    }

    async fn caller_identity(&self) -> Result<CallerIdentity, StorageError> {
        let state = self.begin(StorageOperation::CallerIdentity)?;
        state.identity.clone().ok_or_else(|| StorageError::MissingCredentials {
            detail: "no credentials configured".to_string(),
        })
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StorageError> {
        let mut state = self.begin(StorageOperation::CreateBucket)?;
        if state.foreign.contains(bucket) {
            return Err(StorageError::BucketAlreadyExists {
                bucket: bucket.to_string(),
            });
        }
        if state.buckets.contains_key(bucket) {
            return Err(StorageError::BucketAlreadyOwned {
                bucket: bucket.to_string(),
            });
        }
        state.buckets.insert(
            bucket.to_string(),
            BucketState {
                region: region.to_string(),
                ..BucketState::default()
            },
        );
        Ok(())
    }

    async fn block_public_access(&self, bucket: &str) -> Result<(), StorageError> {
        self.update_bucket(StorageOperation::BlockPublicAccess, bucket, |entry| {
            entry.public_access_blocked = true;
        })
    }

    async fn enable_versioning(&self, bucket: &str) -> Result<(), StorageError> {
        self.update_bucket(StorageOperation::EnableVersioning, bucket, |entry| {
            entry.versioning = true;
        })
    }

    async fn put_lifecycle(
        &self,
        bucket: &str,
        policy: &LifecyclePolicy,
    ) -> Result<(), StorageError> {
        self.update_bucket(StorageOperation::PutLifecycle, bucket, |entry| {
            entry.lifecycle = Some(policy.clone());
        })
    }

    async fn enable_default_encryption(
        &self,
        bucket: &str,
        algorithm: EncryptionAlgorithm,
    ) -> Result<(), StorageError> {
        self.update_bucket(StorageOperation::EnableEncryption, bucket, |entry| {
            entry.encryption = Some(algorithm);
        })
    }

    async fn head_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let state = self.begin(StorageOperation::HeadBucket)?;
        if state.buckets.contains_key(bucket) {
            return Ok(());
        }
        if state.foreign.contains(bucket) {
            return Err(StorageError::AccessDenied {
                bucket: bucket.to_string(),
            });
        }
        Err(not_found(bucket))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.update_bucket(StorageOperation::PutObject, bucket, |entry| {
            entry.objects.insert(
                key.to_string(),
                StoredObject {
                    bytes,
                    content_type: content_type.map(str::to_string),
                },
            );
        })
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        max_bytes: usize,
    ) -> Result<Vec<u8>, StorageError> {
        let state = self.begin(StorageOperation::GetObject)?;
        let entry = state.buckets.get(bucket).ok_or_else(|| not_found(bucket))?;
        let stored = entry.objects.get(key).ok_or_else(|| StorageError::Backend {
            code: Some("NoSuchKey".to_string()),
            message: format!("no such key: {key}"),
        })?;
        let bytes = state.read_override.clone().unwrap_or_else(|| stored.bytes.clone());
        if bytes.len() > max_bytes {
            return Err(StorageError::TooLarge {
                key: key.to_string(),
                max_bytes,
                actual_bytes: bytes.len(),
            });
        }
        Ok(bytes)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.update_bucket(StorageOperation::DeleteObject, bucket, |entry| {
            entry.objects.remove(key);
        })
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let state = self.begin(StorageOperation::PresignGet)?;
        let entry = state.buckets.get(bucket).ok_or_else(|| not_found(bucket))?;
        Ok(format!(
            "https://{bucket}.s3.{}.amazonaws.com/{key}?X-Amz-Expires={}&X-Amz-Signature=memory",
            entry.region,
            expires_in.as_secs()
        ))
    }
}
