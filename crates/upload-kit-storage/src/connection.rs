// crates/upload-kit-storage/src/connection.rs
// ============================================================================
// Module: Connection Check
// Description: Step-by-step verification of credentials and bucket access.
// Purpose: Pinpoint which part of the storage setup is broken.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! The check runs credentials, client, and bucket steps, then the access
//! probe (upload, download, presign, cleanup). It stops at the first failing
//! step and reports the rest as skipped. Cleanup failures are warnings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::client::CallerIdentity;
use crate::client::ObjectStorage;
use crate::client::StepStatus;
use crate::error::StorageError;
use crate::probe::AccessProbe;
use crate::probe::ProbeStepKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Connection check steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStepKind {
    /// Resolve the caller identity.
    Credentials,
    /// Build the storage client for the region.
    Client,
    /// Check the bucket exists and is accessible.
    Bucket,
    /// Upload the probe object.
    Upload,
    /// Download and compare the probe object.
    Download,
    /// Generate a presigned URL.
    Presign,
    /// Delete the probe object.
    Cleanup,
}

impl ConnectionStepKind {
    /// All steps in execution order.
    pub const ALL: [Self; 7] = [
        Self::Credentials,
        Self::Client,
        Self::Bucket,
        Self::Upload,
        Self::Download,
        Self::Presign,
        Self::Cleanup,
    ];

    /// 1-based position, used for "Step N" output.
    #[must_use]
    pub const fn number(self) -> usize {
        match self {
            Self::Credentials => 1,
            Self::Client => 2,
            Self::Bucket => 3,
            Self::Upload => 4,
            Self::Download => 5,
            Self::Presign => 6,
            Self::Cleanup => 7,
        }
    }
}

impl From<ProbeStepKind> for ConnectionStepKind {
    fn from(value: ProbeStepKind) -> Self {
        match value {
            ProbeStepKind::Write => Self::Upload,
            ProbeStepKind::Read => Self::Download,
            ProbeStepKind::Presign => Self::Presign,
            ProbeStepKind::Cleanup => Self::Cleanup,
        }
    }
}

/// One connection check step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStep {
    /// Step kind.
    pub kind: ConnectionStepKind,
    /// Step outcome.
    pub status: StepStatus,
}

/// Connection check outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionReport {
    /// Checked bucket.
    pub bucket: String,
    /// Client region.
    pub region: String,
    /// Caller identity, when resolved.
    pub identity: Option<CallerIdentity>,
    /// One entry per [`ConnectionStepKind`].
    pub steps: Vec<ConnectionStep>,
    /// Presigned URL from the probe, when generated.
    pub presigned_url: Option<String>,
}

impl ConnectionReport {
    /// Returns the first failed step other than cleanup.
    #[must_use]
    pub fn failure(&self) -> Option<(ConnectionStepKind, &StorageError)> {
        self.steps
            .iter()
            .filter(|step| step.kind != ConnectionStepKind::Cleanup)
            .find_map(|step| step.status.error().map(|err| (step.kind, err)))
    }

    /// Returns the status of `kind`.
    #[must_use]
    pub fn status(&self, kind: ConnectionStepKind) -> Option<&StepStatus> {
        self.steps.iter().find(|step| step.kind == kind).map(|step| &step.status)
    }

    /// True when every step except cleanup passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure().is_none()
            && self
                .steps
                .iter()
                .filter(|step| step.kind != ConnectionStepKind::Cleanup)
                .all(|step| step.status.is_passed())
    }
}

// ============================================================================
// SECTION: Check
// ============================================================================

/// Connection check against one bucket.
pub struct ConnectionCheck {
    /// Storage backend.
    storage: Arc<dyn ObjectStorage>,
    /// Bucket under test.
    bucket: String,
    /// Probe run after the bucket step.
    probe: AccessProbe,
}

impl std::fmt::Debug for ConnectionCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCheck")
            .field("bucket", &self.bucket)
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

impl ConnectionCheck {
    /// Creates a check for `bucket`.
    #[must_use]
    pub fn new(storage: Arc<dyn ObjectStorage>, bucket: impl Into<String>, probe: AccessProbe) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            probe,
        }
    }

    /// Runs every step, stopping at the first failure.
    pub async fn run(&self) -> ConnectionReport {
        let region = self.storage.region().to_string();
        let mut done: Vec<ConnectionStep> = Vec::with_capacity(ConnectionStepKind::ALL.len());
        let mut identity = None;
        let mut presigned_url = None;

        let identity_result = self.storage.caller_identity().await;
        done.push(step(ConnectionStepKind::Credentials, StepStatus::from(&identity_result)));
        if let Ok(resolved) = identity_result {
            tracing::debug!(account = %resolved.account, "connection check identity resolved");
            identity = Some(resolved);
            done.push(step(ConnectionStepKind::Client, StepStatus::Passed));
            let head = self.storage.head_bucket(&self.bucket).await;
            done.push(step(ConnectionStepKind::Bucket, StepStatus::from(&head)));
            if head.is_ok() {
                let probe = self.probe.run(self.storage.as_ref(), &self.bucket).await;
                presigned_url = probe.presigned_url.clone();
                for probe_step in probe.steps {
                    if probe_step.status != StepStatus::Skipped {
                        done.push(step(probe_step.kind.into(), probe_step.status));
                    }
                }
            }
        }

        let steps = ConnectionStepKind::ALL
            .iter()
            .map(|kind| {
                done.iter()
                    .find(|existing| existing.kind == *kind)
                    .cloned()
                    .unwrap_or_else(|| step(*kind, StepStatus::Skipped))
            })
            .collect();
        let report = ConnectionReport {
            bucket: self.bucket.clone(),
            region,
            identity,
            steps,
            presigned_url,
        };
        if let Some((kind, err)) = report.failure() {
            tracing::info!(bucket = %self.bucket, step = kind.number(), error = %err, "connection check failed");
        }
        report
    }
}

/// Builds a step entry.
const fn step(kind: ConnectionStepKind, status: StepStatus) -> ConnectionStep {
    ConnectionStep {
        kind,
        status,
    }
}
