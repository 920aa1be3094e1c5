//! Access probe and connection check tests for upload-kit-storage.
// crates/upload-kit-storage/tests/probe_and_connection.rs
// =============================================================================
// Module: Probe and Connection Tests
// Description: Step ordering, failure classification, and cleanup semantics.
// Purpose: Ensure each broken setup surfaces at the right step.
// =============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct expect for clarity."
)]

use std::sync::Arc;

use upload_kit_config::ProbeConfig;
use upload_kit_storage::AccessProbe;
use upload_kit_storage::ConnectionCheck;
use upload_kit_storage::ConnectionStepKind;
use upload_kit_storage::InMemoryStorage;
use upload_kit_storage::ProbeStepKind;
use upload_kit_storage::StepStatus;
use upload_kit_storage::StorageError;
use upload_kit_storage::StorageOperation;
use upload_kit_storage::probe::CONNECTION_PROBE_CONTENT;
use upload_kit_storage::probe::CONNECTION_PROBE_KEY;

const BUCKET: &str = "mcp-uploads-feedc0de";

fn storage_with_bucket() -> Arc<InMemoryStorage> {
    let storage = Arc::new(InMemoryStorage::new("us-east-1"));
    storage.add_bucket(BUCKET);
    storage
}

fn check(storage: &Arc<InMemoryStorage>, bucket: &str) -> ConnectionCheck {
    ConnectionCheck::new(
        storage.clone(),
        bucket,
        AccessProbe::for_connection(&ProbeConfig::default()),
    )
}

fn statuses(report: &upload_kit_storage::ConnectionReport) -> Vec<&'static str> {
    report
        .steps
        .iter()
        .map(|step| match step.status {
            StepStatus::Passed => "passed",
            StepStatus::Failed(_) => "failed",
            StepStatus::Skipped => "skipped",
        })
        .collect()
}

#[tokio::test]
async fn probe_writes_reads_presigns_and_deletes() {
    let storage = storage_with_bucket();
    let probe = AccessProbe::for_connection(&ProbeConfig::default());
    let report = probe.run(storage.as_ref(), BUCKET).await;

    assert!(report.passed());
    assert_eq!(report.key, CONNECTION_PROBE_KEY);
    let url = report.presigned_url.as_deref().expect("url");
    assert!(url.contains(CONNECTION_PROBE_KEY));
    assert!(url.contains("X-Amz-Expires=3600"));
    assert_eq!(
        storage.calls(),
        vec![
            StorageOperation::PutObject,
            StorageOperation::GetObject,
            StorageOperation::PresignGet,
            StorageOperation::DeleteObject,
        ]
    );
    assert!(storage.object(BUCKET, CONNECTION_PROBE_KEY).is_none());
}

#[tokio::test]
async fn probe_cleans_up_after_read_failure() {
    let storage = storage_with_bucket();
    storage.override_reads(b"something else".to_vec());
    let report = AccessProbe::for_connection(&ProbeConfig::default()).run(storage.as_ref(), BUCKET).await;

    let (kind, err) = report.failure().expect("failure");
    assert_eq!(kind, ProbeStepKind::Read);
    assert_eq!(
        *err,
        StorageError::ContentMismatch {
            key: CONNECTION_PROBE_KEY.to_string(),
            expected: CONNECTION_PROBE_CONTENT.len(),
            actual: "something else".len(),
        }
    );
    assert_eq!(report.status(ProbeStepKind::Presign), Some(&StepStatus::Skipped));
    assert_eq!(report.status(ProbeStepKind::Cleanup), Some(&StepStatus::Passed));
    assert!(storage.object(BUCKET, CONNECTION_PROBE_KEY).is_none());
}

#[tokio::test]
async fn probe_skips_cleanup_when_write_fails() {
    let storage = storage_with_bucket();
    storage.fail_next(
        StorageOperation::PutObject,
        StorageError::AccessDenied {
            bucket: BUCKET.to_string(),
        },
    );
    let report = AccessProbe::for_connection(&ProbeConfig::default()).run(storage.as_ref(), BUCKET).await;
    assert_eq!(report.failure().map(|(kind, _)| kind), Some(ProbeStepKind::Write));
    assert_eq!(report.status(ProbeStepKind::Cleanup), Some(&StepStatus::Skipped));
    assert!(!storage.calls().contains(&StorageOperation::DeleteObject));
}

#[tokio::test]
async fn probe_read_limit_is_enforced() {
    let storage = storage_with_bucket();
    let config = ProbeConfig {
        max_object_bytes: 4,
        ..ProbeConfig::default()
    };
    let report = AccessProbe::for_connection(&config).run(storage.as_ref(), BUCKET).await;
    let (_, err) = report.failure().expect("failure");
    assert!(matches!(err, StorageError::TooLarge { max_bytes: 4, .. }));
}

#[tokio::test]
async fn connection_check_passes_all_steps() {
    let storage = storage_with_bucket();
    let report = check(&storage, BUCKET).run().await;
    assert!(report.passed());
    assert_eq!(statuses(&report), vec!["passed"; 7]);
    assert_eq!(report.region, "us-east-1");
    assert!(report.identity.is_some());
    assert!(report.presigned_url.is_some());
}

#[tokio::test]
async fn connection_check_reports_missing_credentials_first() {
    let storage = storage_with_bucket();
    storage.set_identity(None);
    let report = check(&storage, BUCKET).run().await;
    let (kind, err) = report.failure().expect("failure");
    assert_eq!(kind, ConnectionStepKind::Credentials);
    assert!(matches!(err, StorageError::MissingCredentials { .. }));
    assert_eq!(statuses(&report), vec![
        "failed", "skipped", "skipped", "skipped", "skipped", "skipped", "skipped"
    ]);
}

#[tokio::test]
async fn connection_check_distinguishes_bad_keys() {
    for (injected, expected_secret) in
        [(StorageError::InvalidAccessKeyId, false), (StorageError::SignatureMismatch, true)]
    {
        let storage = storage_with_bucket();
        storage.fail_next(StorageOperation::CallerIdentity, injected);
        let report = check(&storage, BUCKET).run().await;
        let (_, err) = report.failure().expect("failure");
        assert_eq!(matches!(err, StorageError::SignatureMismatch), expected_secret);
    }
}

#[tokio::test]
async fn connection_check_reports_missing_bucket() {
    let storage = storage_with_bucket();
    let report = check(&storage, "mcp-uploads-missing").run().await;
    let (kind, err) = report.failure().expect("failure");
    assert_eq!(kind, ConnectionStepKind::Bucket);
    assert!(matches!(err, StorageError::BucketNotFound { .. }));
    assert_eq!(report.status(ConnectionStepKind::Upload), Some(&StepStatus::Skipped));
}

#[tokio::test]
async fn connection_check_reports_foreign_bucket_as_denied() {
    let storage = storage_with_bucket();
    storage.reserve_name("someone-elses-bucket");
    let report = check(&storage, "someone-elses-bucket").run().await;
    let (kind, err) = report.failure().expect("failure");
    assert_eq!(kind, ConnectionStepKind::Bucket);
    assert!(matches!(err, StorageError::AccessDenied { .. }));
}

#[tokio::test]
async fn connection_cleanup_failure_is_only_a_warning() {
    let storage = storage_with_bucket();
    storage.fail_next(
        StorageOperation::DeleteObject,
        StorageError::AccessDenied {
            bucket: BUCKET.to_string(),
        },
    );
    let report = check(&storage, BUCKET).run().await;
    assert!(report.passed());
    assert!(report.failure().is_none());
    assert!(matches!(report.status(ConnectionStepKind::Cleanup), Some(StepStatus::Failed(_))));
}

#[tokio::test]
async fn connection_report_serializes_steps() {
    let storage = storage_with_bucket();
    let report = check(&storage, BUCKET).run().await;
    let value = serde_json::to_value(&report).expect("json");
    assert_eq!(value["steps"][0]["kind"], "credentials");
    assert_eq!(value["steps"][0]["status"]["status"], "passed");
    assert_eq!(value["bucket"], BUCKET);
}
