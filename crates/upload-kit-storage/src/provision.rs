// crates/upload-kit-storage/src/provision.rs
// ============================================================================
// Module: Bucket Provisioning
// Description: Create a uniquely named bucket, harden it, and probe access.
// Purpose: One-shot setup of the bucket used by the upload server.
// Dependencies: serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`BucketProvisioner::provision`] runs three phases:
//! 1. Identity check, then bucket creation with a fresh random name. A global
//!    name collision retries with a new name, up to a fixed number of attempts.
//! 2. Hardening: public access block, versioning, lifecycle, encryption. The
//!    first failing setting is reported and the rest are skipped; the bucket
//!    is kept either way.
//! 3. The access probe. A failed probe is reported, not fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use upload_kit_config::UploadKitConfig;

use crate::client::BucketSetting;
use crate::client::CallerIdentity;
use crate::client::EncryptionAlgorithm;
use crate::client::LifecyclePolicy;
use crate::client::ObjectStorage;
use crate::client::StepStatus;
use crate::error::StorageError;
use crate::naming::BucketNamer;
use crate::probe::AccessProbe;
use crate::probe::ProbeReport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provisioning failures that leave no usable bucket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    /// Credentials could not be verified.
    #[error("unable to verify credentials: {0}")]
    Identity(StorageError),
    /// Every generated name collided with an existing bucket.
    #[error("no free bucket name after {attempts} attempts")]
    NameAttemptsExhausted {
        /// Attempts made.
        attempts: u32,
        /// Names that collided.
        collisions: Vec<String>,
    },
    /// Bucket creation failed for a reason other than a name collision.
    #[error("bucket creation failed: {0}")]
    Create(StorageError),
    /// Provisioning settings are invalid.
    #[error("invalid provisioning settings: {0}")]
    Invalid(StorageError),
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Outcome of one hardening setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingOutcome {
    /// Setting.
    pub setting: BucketSetting,
    /// Outcome.
    pub status: StepStatus,
}

/// Successful provisioning outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    /// Identity behind the credentials.
    pub identity: CallerIdentity,
    /// Created bucket name.
    pub bucket: String,
    /// Region the bucket was created in.
    pub region: String,
    /// Creation attempts (1 when the first name was free).
    pub attempts: u32,
    /// Names that collided before `bucket` was created.
    pub collisions: Vec<String>,
    /// Hardening outcomes in application order.
    pub settings: Vec<SettingOutcome>,
    /// Access probe outcome.
    pub probe: ProbeReport,
}

// ============================================================================
// SECTION: Provisioner
// ============================================================================

/// Bucket provisioning workflow.
pub struct BucketProvisioner {
    /// Storage backend.
    storage: Arc<dyn ObjectStorage>,
    /// Name generator.
    namer: BucketNamer,
    /// Maximum creation attempts.
    max_attempts: u32,
    /// Lifecycle rule.
    lifecycle: LifecyclePolicy,
    /// Default encryption.
    encryption: EncryptionAlgorithm,
    /// Post-setup probe.
    probe: AccessProbe,
}

impl std::fmt::Debug for BucketProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketProvisioner")
            .field("region", &self.storage.region())
            .field("namer", &self.namer)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl BucketProvisioner {
    /// Builds a provisioner from tool configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Invalid`] when generated names would be invalid.
    pub fn from_config(
        storage: Arc<dyn ObjectStorage>,
        config: &UploadKitConfig,
    ) -> Result<Self, ProvisionError> {
        let provision = &config.provision;
        let namer = BucketNamer::from_config(provision).map_err(ProvisionError::Invalid)?;
        Ok(Self {
            storage,
            namer,
            max_attempts: provision.max_name_attempts.max(1),
            lifecycle: LifecyclePolicy {
                rule_id: provision.lifecycle_rule_id.clone(),
                prefix: String::new(),
                expiration_days: provision.expiration_days,
                noncurrent_days: provision.noncurrent_expiration_days,
            },
            encryption: provision.encryption.into(),
            probe: AccessProbe::for_setup(&config.probe),
        })
    }

    /// Runs identity check, creation, hardening, and the access probe.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] when credentials fail or no bucket could be
    /// created. Hardening and probe failures are carried in the report.
    pub async fn provision(&self) -> Result<ProvisionReport, ProvisionError> {
        let identity = self.storage.caller_identity().await.map_err(ProvisionError::Identity)?;
        tracing::info!(account = %identity.account, arn = %identity.arn, "credentials verified");

        let region = self.storage.region().to_string();
        let (bucket, attempts, collisions) = self.create_unique_bucket(&region).await?;
        let settings = self.apply_settings(&bucket).await;
        let probe = self.probe.run(self.storage.as_ref(), &bucket).await;
        if !probe.passed() {
            tracing::warn!(bucket = %bucket, "access probe failed after provisioning");
        }
        Ok(ProvisionReport {
            identity,
            bucket,
            region,
            attempts,
            collisions,
            settings,
            probe,
        })
    }

    /// Creates a bucket, retrying with fresh names on global collisions.
    async fn create_unique_bucket(
        &self,
        region: &str,
    ) -> Result<(String, u32, Vec<String>), ProvisionError> {
        let mut collisions = Vec::new();
        for attempt in 1 ..= self.max_attempts {
            let bucket = self.namer.generate();
            match self.storage.create_bucket(&bucket, region).await {
                Ok(()) => {
                    tracing::info!(bucket = %bucket, region, attempt, "bucket created");
                    return Ok((bucket, attempt, collisions));
                }
                Err(StorageError::BucketAlreadyExists {
                    ..
                }) => {
                    tracing::info!(bucket = %bucket, attempt, "bucket name taken; retrying");
                    collisions.push(bucket);
                }
                Err(err) => return Err(ProvisionError::Create(err)),
            }
        }
        Err(ProvisionError::NameAttemptsExhausted {
            attempts: self.max_attempts,
            collisions,
        })
    }

    /// Applies hardening settings, stopping at the first failure.
    async fn apply_settings(&self, bucket: &str) -> Vec<SettingOutcome> {
        let mut outcomes = Vec::with_capacity(BucketSetting::ALL.len());
        let mut failed = false;
        for setting in BucketSetting::ALL {
            if failed {
                outcomes.push(SettingOutcome {
                    setting,
                    status: StepStatus::Skipped,
                });
                continue;
            }
            let result = self.apply_setting(bucket, setting).await;
            if let Err(err) = &result {
                tracing::warn!(bucket, setting = setting.as_str(), error = %err, "bucket setting failed");
                failed = true;
            }
            outcomes.push(SettingOutcome {
                setting,
                status: StepStatus::from(&result),
            });
        }
        outcomes
    }

    /// Applies a single hardening setting.
    async fn apply_setting(&self, bucket: &str, setting: BucketSetting) -> Result<(), StorageError> {
        match setting {
            BucketSetting::PublicAccessBlock => self.storage.block_public_access(bucket).await,
            BucketSetting::Versioning => self.storage.enable_versioning(bucket).await,
            BucketSetting::Lifecycle => self.storage.put_lifecycle(bucket, &self.lifecycle).await,
            BucketSetting::Encryption => {
                self.storage.enable_default_encryption(bucket, self.encryption).await
            }
        }
    }
}
