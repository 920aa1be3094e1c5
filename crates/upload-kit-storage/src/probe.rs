// crates/upload-kit-storage/src/probe.rs
// ============================================================================
// Module: Access Probe
// Description: Write, read back, presign, and delete a probe object.
// Purpose: Prove that credentials can use a bucket end to end.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! The probe stops at the first failing step. Once the write has succeeded a
//! delete is always attempted so the probe object does not linger; a failed
//! delete is reported but does not fail the probe.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;
use upload_kit_config::ProbeConfig;

use crate::client::ObjectStorage;
use crate::client::StepStatus;
use crate::error::StorageError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Probe key used after provisioning.
pub const SETUP_PROBE_KEY: &str = "test-access.txt";
/// Probe content used after provisioning.
pub const SETUP_PROBE_CONTENT: &str = "MCP server access test";
/// Probe key used by the connection check.
pub const CONNECTION_PROBE_KEY: &str = "test-connection.txt";
/// Probe content used by the connection check.
pub const CONNECTION_PROBE_CONTENT: &str = "MCP server connection test";
/// Content type of probe objects.
const PROBE_CONTENT_TYPE: &str = "text/plain";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Probe steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStepKind {
    /// Upload the probe object.
    Write,
    /// Download and compare the probe object.
    Read,
    /// Generate a presigned GET URL.
    Presign,
    /// Delete the probe object.
    Cleanup,
}

impl ProbeStepKind {
    /// All steps in execution order.
    pub const ALL: [Self; 4] = [Self::Write, Self::Read, Self::Presign, Self::Cleanup];
}

/// One executed (or skipped) probe step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeStep {
    /// Step kind.
    pub kind: ProbeStepKind,
    /// Step outcome.
    pub status: StepStatus,
}

/// Probe outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    /// Probed bucket.
    pub bucket: String,
    /// Probe object key.
    pub key: String,
    /// Steps in execution order; always one entry per [`ProbeStepKind`].
    pub steps: Vec<ProbeStep>,
    /// Presigned URL, when generated.
    pub presigned_url: Option<String>,
}

impl ProbeReport {
    /// Returns the status of `kind`.
    #[must_use]
    pub fn status(&self, kind: ProbeStepKind) -> Option<&StepStatus> {
        self.steps.iter().find(|step| step.kind == kind).map(|step| &step.status)
    }

    /// Returns the first failure among the non-cleanup steps.
    #[must_use]
    pub fn failure(&self) -> Option<(ProbeStepKind, &StorageError)> {
        self.steps
            .iter()
            .filter(|step| step.kind != ProbeStepKind::Cleanup)
            .find_map(|step| step.status.error().map(|err| (step.kind, err)))
    }

    /// True when write, read, and presign all passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.steps
            .iter()
            .filter(|step| step.kind != ProbeStepKind::Cleanup)
            .all(|step| step.status.is_passed())
    }
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Write/read/presign/delete probe definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessProbe {
    /// Object key.
    pub key: String,
    /// Object content.
    pub content: Vec<u8>,
    /// Presigned URL lifetime.
    pub presign_expiry: Duration,
    /// Read-back size limit.
    pub max_bytes: usize,
}

impl AccessProbe {
    /// Probe used after provisioning a bucket.
    #[must_use]
    pub fn for_setup(config: &ProbeConfig) -> Self {
        Self::with_object(config, SETUP_PROBE_KEY, SETUP_PROBE_CONTENT)
    }

    /// Probe used by the connection check.
    #[must_use]
    pub fn for_connection(config: &ProbeConfig) -> Self {
        Self::with_object(config, CONNECTION_PROBE_KEY, CONNECTION_PROBE_CONTENT)
    }

    /// Probe with an explicit key and content.
    #[must_use]
    pub fn with_object(config: &ProbeConfig, key: &str, content: &str) -> Self {
        Self {
            key: key.to_string(),
            content: content.as_bytes().to_vec(),
            presign_expiry: config.presign_expiry(),
            max_bytes: config.max_object_bytes,
        }
    }

    /// Runs the probe against `bucket`.
    pub async fn run(&self, storage: &dyn ObjectStorage, bucket: &str) -> ProbeReport {
        let mut statuses: Vec<(ProbeStepKind, StepStatus)> = Vec::with_capacity(4);
        let mut presigned_url = None;

        let write = storage
            .put_object(bucket, &self.key, self.content.clone(), Some(PROBE_CONTENT_TYPE))
            .await;
        statuses.push((ProbeStepKind::Write, StepStatus::from(&write)));

        if write.is_ok() {
            let read = self.read_back(storage, bucket).await;
            statuses.push((ProbeStepKind::Read, StepStatus::from(&read)));
            if read.is_ok() {
                let presign = storage.presign_get(bucket, &self.key, self.presign_expiry).await;
                statuses.push((ProbeStepKind::Presign, StepStatus::from(&presign)));
                presigned_url = presign.ok();
            }
            let cleanup = storage.delete_object(bucket, &self.key).await;
            if let Err(err) = &cleanup {
                tracing::warn!(bucket, key = %self.key, error = %err, "probe cleanup failed");
            }
            statuses.push((ProbeStepKind::Cleanup, StepStatus::from(&cleanup)));
        }

        let steps = ProbeStepKind::ALL
            .iter()
            .map(|kind| ProbeStep {
                kind: *kind,
                status: statuses
                    .iter()
                    .find(|(done, _)| done == kind)
                    .map_or(StepStatus::Skipped, |(_, status)| status.clone()),
            })
            .collect();
        let report = ProbeReport {
            bucket: bucket.to_string(),
            key: self.key.clone(),
            steps,
            presigned_url,
        };
        tracing::debug!(bucket, key = %self.key, passed = report.passed(), "access probe finished");
        report
    }

    /// Downloads the probe object and compares it byte for byte.
    async fn read_back(
        &self,
        storage: &dyn ObjectStorage,
        bucket: &str,
    ) -> Result<(), StorageError> {
        let bytes = storage.get_object(bucket, &self.key, self.max_bytes).await?;
        if bytes != self.content {
            return Err(StorageError::ContentMismatch {
                key: self.key.clone(),
                expected: self.content.len(),
                actual: bytes.len(),
            });
        }
        Ok(())
    }
}
