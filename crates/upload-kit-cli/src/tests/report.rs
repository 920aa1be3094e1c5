// crates/upload-kit-cli/src/tests/report.rs
// ============================================================================
// Module: Report Rendering Tests
// Description: Unit tests for the operator-facing line sequences.
// Purpose: Pin the rendered output of each workflow branch.
// Dependencies: upload-kit-storage in-memory backend, upload-kit-mcp models
// ============================================================================

//! ## Overview
//! Reports are produced by running the real workflows against the in-memory
//! storage backend, then rendered and checked line by line.

use std::sync::Arc;

use upload_kit_config::UploadKitConfig;
use upload_kit_mcp::client::ToolDefinition;
use upload_kit_mcp::progress::ProgressBar;
use upload_kit_mcp::progress::ProgressUpdate;
use upload_kit_mcp::upload::UploadResult;
use upload_kit_storage::AccessProbe;
use upload_kit_storage::BucketProvisioner;
use upload_kit_storage::ConnectionCheck;
use upload_kit_storage::ConnectionReport;
use upload_kit_storage::InMemoryStorage;
use upload_kit_storage::ProvisionError;
use upload_kit_storage::StorageError;
use upload_kit_storage::StorageOperation;

use crate::report::check_outcome_lines;
use crate::report::connection_lines;
use crate::report::missing_env_lines;
use crate::report::progress_line;
use crate::report::progress_result_lines;
use crate::report::provision_lines;
use crate::report::smoke_result_lines;
use crate::report::step_marker;
use crate::report::tool_lines;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const BUCKET: &str = "mcp-uploads-0badc0de";
const HINT: &str = "python mcp_box.py";

async fn check(storage: Arc<InMemoryStorage>) -> ConnectionReport {
    let config = UploadKitConfig::default();
    let probe = AccessProbe::for_connection(&config.probe);
    ConnectionCheck::new(storage, BUCKET, probe).run().await
}

fn contains(lines: &[String], needle: &str) -> bool {
    lines.iter().any(|line| line.contains(needle))
}

fn sample_result() -> UploadResult {
    UploadResult {
        url: format!(
            "https://{BUCKET}.s3.amazonaws.com/test-upload.txt?X-Amz-Signature={}",
            "f".repeat(64)
        ),
        size: 2_050_000,
        mime_type: "text/plain".to_string(),
        s3_key: "test-upload.txt".to_string(),
    }
}

// ============================================================================
// SECTION: Bucket Setup
// ============================================================================

#[tokio::test]
async fn setup_success_renders_every_phase_in_order() {
    let config = UploadKitConfig::default();
    let storage = Arc::new(InMemoryStorage::new("eu-west-1"));
    let outcome = BucketProvisioner::from_config(storage, &config).unwrap().provision().await;
    let report = outcome.as_ref().unwrap();
    let lines = provision_lines(&outcome, &config);

    let creating = format!("Creating S3 bucket: {}", report.bucket);
    let launch = format!("python mcp_box.py --bucket {} --root", report.bucket);
    let save = format!("Save this bucket name: {}", report.bucket);
    let order: [&str; 16] = [
        "Checking AWS credentials",
        "AWS Account ID: 123456789012",
        &creating,
        "Using region: eu-west-1",
        "Bucket created successfully",
        "Public access blocked",
        "Versioning enabled",
        "Lifecycle policy set (30-day retention)",
        "Server-side encryption enabled (AES256)",
        "Write access confirmed",
        "Read access confirmed",
        "Presigned URL generation confirmed",
        "Test cleanup completed",
        "Setup complete!",
        &launch,
        &save,
    ];
    let mut cursor = 0;
    for needle in order {
        let offset = lines[cursor ..]
            .iter()
            .position(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("missing or out of order: {needle}\n{lines:#?}"));
        cursor += offset + 1;
    }
}

#[tokio::test]
async fn setup_collision_is_reported_before_the_created_name() {
    let config = UploadKitConfig::default();
    let storage = Arc::new(InMemoryStorage::new("us-east-1"));
    storage.fail_next(
        StorageOperation::CreateBucket,
        StorageError::BucketAlreadyExists {
            bucket: "taken".to_string(),
        },
    );
    let outcome = BucketProvisioner::from_config(storage, &config).unwrap().provision().await;
    let report = outcome.as_ref().unwrap();
    assert_eq!(report.collisions.len(), 1);
    let lines = provision_lines(&outcome, &config);
    let collided = &report.collisions[0];
    assert!(contains(&lines, &format!("Bucket name {collided} already exists globally")));
    assert!(contains(&lines, "Bucket created successfully"));
}

#[tokio::test]
async fn setup_settings_failure_is_a_warning_and_setup_completes() {
    let config = UploadKitConfig::default();
    let storage = Arc::new(InMemoryStorage::new("us-east-1"));
    storage.fail_next(
        StorageOperation::EnableVersioning,
        StorageError::Backend {
            code: Some("AccessDenied".to_string()),
            message: "nope".to_string(),
        },
    );
    let outcome = BucketProvisioner::from_config(storage, &config).unwrap().provision().await;
    let lines = provision_lines(&outcome, &config);
    assert!(contains(&lines, "Public access blocked"));
    assert!(contains(&lines, "Warning: Could not configure some settings"));
    assert!(!contains(&lines, "Versioning enabled"));
    assert!(!contains(&lines, "Lifecycle policy set"));
    assert!(contains(&lines, "Setup complete!"));
}

#[test]
fn setup_credentials_failure_prints_help_and_stops() {
    let config = UploadKitConfig::default();
    let outcome = Err(ProvisionError::Identity(StorageError::MissingCredentials {
        detail: "no chain".to_string(),
    }));
    let lines = provision_lines(&outcome, &config);
    assert!(contains(&lines, "AWS credentials not configured"));
    assert!(contains(&lines, "Option 1: aws configure"));
    assert!(contains(&lines, "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY"));
    assert!(!contains(&lines, "Setup failed"));
}

#[test]
fn setup_exhausted_names_ends_with_failure() {
    let config = UploadKitConfig::default();
    let outcome = Err(ProvisionError::NameAttemptsExhausted {
        attempts: 2,
        collisions: vec!["mcp-uploads-aaaaaaaa".to_string(), "mcp-uploads-bbbbbbbb".to_string()],
    });
    let lines = provision_lines(&outcome, &config);
    assert!(contains(&lines, "Bucket name mcp-uploads-bbbbbbbb already exists globally"));
    assert!(contains(&lines, "No free bucket name after 2 attempts"));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("❌ Setup failed. Please check your AWS permissions.")
    );
}

// ============================================================================
// SECTION: Connection Check
// ============================================================================

#[test]
fn step_markers_are_keycaps() {
    assert_eq!(step_marker(1), "1\u{fe0f}\u{20e3}");
    assert_eq!(step_marker(7), "7️⃣");
}

#[test]
fn missing_variables_print_template() {
    let lines = missing_env_lines(&["AWS_SECRET_ACCESS_KEY", "S3_BUCKET_NAME"], ".env");
    assert_eq!(lines[0], "❌ Missing required environment variables:");
    assert_eq!(lines[1], "   - AWS_SECRET_ACCESS_KEY");
    assert_eq!(lines[2], "   - S3_BUCKET_NAME");
    assert!(contains(&lines, "Create a .env file"));
    assert!(lines.contains(&"AWS_DEFAULT_REGION=us-east-1".to_string()));
    assert!(lines.contains(&"S3_BUCKET_NAME=your_bucket_name_here".to_string()));
}

#[tokio::test]
async fn passing_check_renders_seven_steps_and_launch_hint() {
    let storage = Arc::new(InMemoryStorage::new("us-west-2"));
    storage.add_bucket(BUCKET);
    let report = check(storage).await;
    assert!(report.passed());
    let lines = connection_lines(&report, HINT);
    for number in 1 ..= 7 {
        assert!(contains(&lines, &step_marker(number)), "step {number} missing");
    }
    assert!(contains(&lines, "Region: us-west-2"));
    assert!(contains(&lines, &format!("Bucket '{BUCKET}' exists and is accessible!")));
    let url_line = lines.iter().find(|line| line.contains("🔗 URL: ")).unwrap();
    assert!(url_line.ends_with("..."));
    assert!(contains(&lines, "All tests passed!"));
    assert!(contains(&lines, &format!("{HINT} --bucket {BUCKET} --root /path/to/upload/folder")));
}

#[tokio::test]
async fn missing_bucket_stops_at_step_three() {
    let storage = Arc::new(InMemoryStorage::new("us-east-1"));
    let report = check(storage).await;
    let lines = connection_lines(&report, HINT);
    assert_eq!(lines.last().unwrap(), &format!("   ❌ Bucket '{BUCKET}' does not exist!"));
    assert!(!contains(&lines, &step_marker(4)));
    assert!(!contains(&lines, "All tests passed!"));
}

#[tokio::test]
async fn denied_bucket_prints_permission_hint() {
    let storage = Arc::new(InMemoryStorage::new("us-east-1"));
    storage.add_bucket(BUCKET);
    storage.fail_next(
        StorageOperation::HeadBucket,
        StorageError::AccessDenied {
            bucket: BUCKET.to_string(),
        },
    );
    let lines = connection_lines(&check(storage).await, HINT);
    assert!(contains(&lines, &format!("Access denied to bucket '{BUCKET}'!")));
    assert_eq!(lines.last().unwrap(), "   💡 Check your IAM user permissions");
}

#[tokio::test]
async fn credential_errors_get_dedicated_messages() {
    let cases = [
        (StorageError::InvalidAccessKeyId, "❌ Invalid AWS Access Key ID!"),
        (StorageError::SignatureMismatch, "❌ Invalid AWS Secret Access Key!"),
        (
            StorageError::MissingCredentials {
                detail: "none".to_string(),
            },
            "❌ AWS credentials not found or invalid!",
        ),
    ];
    for (error, expected) in cases {
        let storage = Arc::new(InMemoryStorage::new("us-east-1"));
        storage.fail_next(StorageOperation::CallerIdentity, error);
        let lines = connection_lines(&check(storage).await, HINT);
        assert_eq!(lines.last().unwrap(), expected);
    }
}

#[tokio::test]
async fn content_mismatch_is_reported_at_download() {
    let storage = Arc::new(InMemoryStorage::new("us-east-1"));
    storage.add_bucket(BUCKET);
    storage.override_reads(b"something else".to_vec());
    let lines = connection_lines(&check(storage).await, HINT);
    assert_eq!(lines.last().unwrap(), "   ❌ Downloaded content doesn't match!");
}

#[tokio::test]
async fn cleanup_failure_is_only_a_warning() {
    let storage = Arc::new(InMemoryStorage::new("us-east-1"));
    storage.add_bucket(BUCKET);
    storage.fail_next(StorageOperation::DeleteObject, StorageError::io("disk"));
    let report = check(storage).await;
    assert!(report.passed());
    let lines = connection_lines(&report, HINT);
    assert!(contains(&lines, "Warning: Could not delete test file"));
    assert!(contains(&lines, "All tests passed!"));
}

#[test]
fn outcome_lines_cover_both_verdicts() {
    assert!(contains(&check_outcome_lines(true, ".env"), "Setup is ready for MCP server!"));
    let failed = check_outcome_lines(false, "prod.env");
    assert!(contains(&failed, "Please fix the issues above"));
    assert!(contains(&failed, "Check your prod.env file"));
}

// ============================================================================
// SECTION: MCP
// ============================================================================

#[test]
fn tools_render_with_fallback_description() {
    let tools = vec![
        ToolDefinition {
            name: "upload_file".to_string(),
            description: Some("Upload a file".to_string()),
            input_schema: serde_json::json!({}),
        },
        ToolDefinition {
            name: "ping".to_string(),
            description: None,
            input_schema: serde_json::json!({}),
        },
    ];
    let lines = tool_lines(&tools);
    assert_eq!(lines[1], "  • upload_file: Upload a file");
    assert_eq!(lines[2], "  • ping: (no description)");
}

#[test]
fn smoke_result_truncates_url_and_groups_size() {
    let result = sample_result();
    let lines = smoke_result_lines(&result, BUCKET);
    let url_line = lines.iter().find(|line| line.starts_with("🔗 Presigned URL: ")).unwrap();
    let shown = url_line.trim_start_matches("🔗 Presigned URL: ");
    assert_eq!(shown.chars().count(), 63);
    assert!(contains(&lines, "📏 File size: 2,050,000 bytes"));
    assert!(contains(&lines, "🎭 MIME type: text/plain"));
    assert!(contains(&lines, "🔑 S3 key: test-upload.txt"));
    assert!(contains(&lines, &format!("🪣 S3 bucket: {BUCKET}")));
}

#[test]
fn progress_result_uses_shorter_url() {
    let lines = progress_result_lines(&sample_result(), BUCKET);
    let url_line = lines.iter().find(|line| line.starts_with("🔗 URL: ")).unwrap();
    assert_eq!(url_line.trim_start_matches("🔗 URL: ").chars().count(), 53);
    assert!(contains(&lines, "📏 Final size: 2,050,000 bytes"));
}

#[test]
fn progress_line_renders_bar_or_raw_value() {
    let bounded = ProgressUpdate {
        progress: 25.0,
        total: Some(100.0),
        message: Some("uploading".to_string()),
    };
    let line = progress_line(&bounded, ProgressBar::new(4));
    assert_eq!(line, "📊 Progress: [█░░░] 25.0% uploading");

    let unbounded = ProgressUpdate {
        progress: 512.0,
        total: None,
        message: None,
    };
    assert_eq!(progress_line(&unbounded, ProgressBar::default()), "📊 Progress: 512.0 ");
}
