// crates/upload-kit-cli/src/report.rs
// ============================================================================
// Module: Report Rendering
// Description: Localized text rendering for workflow reports.
// Purpose: Turn provisioning, connection, and MCP results into output lines.
// Dependencies: upload-kit-config, upload-kit-mcp, upload-kit-storage
// ============================================================================

//! ## Overview
//! Workflows in the library crates return structured reports; this module
//! renders them as the operator-facing line sequence. Empty strings stand for
//! blank separator lines. Rendering is pure so every branch can be tested
//! against in-memory reports.

// ============================================================================
// SECTION: Imports
// ============================================================================

use upload_kit_config::UploadKitConfig;
use upload_kit_config::env::ACCESS_KEY_VAR;
use upload_kit_config::env::ENV_TEMPLATE;
use upload_kit_config::env::SECRET_KEY_VAR;
use upload_kit_mcp::client::ToolDefinition;
use upload_kit_mcp::progress::ProgressBar;
use upload_kit_mcp::progress::ProgressUpdate;
use upload_kit_mcp::upload::UploadResult;
use upload_kit_mcp::upload::group_thousands;
use upload_kit_mcp::upload::truncate_url;
use upload_kit_storage::BucketSetting;
use upload_kit_storage::ConnectionReport;
use upload_kit_storage::ConnectionStepKind;
use upload_kit_storage::EncryptionAlgorithm;
use upload_kit_storage::ProbeReport;
use upload_kit_storage::ProbeStepKind;
use upload_kit_storage::ProvisionError;
use upload_kit_storage::ProvisionReport;
use upload_kit_storage::StepStatus;
use upload_kit_storage::StorageError;

use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Characters of a presigned URL shown by the connection check and smoke test.
pub const SHORT_URL_CHARS: usize = 60;
/// Characters of a presigned URL shown by the progress test.
pub const PROGRESS_URL_CHARS: usize = 50;

// ============================================================================
// SECTION: Bucket Setup
// ============================================================================

/// Renders the outcome of `bucket setup`.
#[must_use]
pub fn provision_lines(
    outcome: &Result<ProvisionReport, ProvisionError>,
    config: &UploadKitConfig,
) -> Vec<String> {
    let mut lines = vec![t!("setup.banner"), String::new(), t!("setup.credentials.header")];
    let report = match outcome {
        Ok(report) => report,
        Err(err) => {
            lines.extend(provision_failure_lines(err));
            return lines;
        }
    };

    lines.push(t!("setup.credentials.account", account = report.identity.account));
    lines.push(t!("setup.credentials.arn", arn = report.identity.arn));
    lines.push(String::new());
    for collided in &report.collisions {
        lines.push(t!("setup.bucket.creating", bucket = collided));
        lines.push(t!("setup.bucket.region", region = report.region));
        lines.push(t!("setup.bucket.collision", bucket = collided));
    }
    lines.push(t!("setup.bucket.creating", bucket = report.bucket));
    lines.push(t!("setup.bucket.region", region = report.region));
    lines.push(t!("setup.bucket.created"));
    lines.push(String::new());

    lines.push(t!("setup.settings.header"));
    for outcome in &report.settings {
        match &outcome.status {
            StepStatus::Passed => lines.push(setting_line(outcome.setting, config)),
            StepStatus::Failed(err) => lines.push(t!("setup.settings.failed", error = err)),
            StepStatus::Skipped => {}
        }
    }
    lines.push(String::new());

    lines.push(t!("setup.probe.header"));
    lines.extend(probe_lines(&report.probe));
    lines.push(String::new());

    lines.push(t!("setup.complete"));
    lines.push(t!("setup.bucket_name", bucket = report.bucket));
    lines.push(t!("setup.launch.header"));
    lines.push(t!("setup.launch.command", hint = config.mcp.launch_hint, bucket = report.bucket));
    lines.push(String::new());
    lines.push(t!("setup.save_name", bucket = report.bucket));
    lines.push(t!("setup.next"));
    lines
}

/// Renders the failure tail for a setup that produced no bucket.
fn provision_failure_lines(err: &ProvisionError) -> Vec<String> {
    match err {
        ProvisionError::Identity(inner) => vec![
            t!("setup.credentials.failed", error = inner),
            String::new(),
            t!("setup.credentials.help.header"),
            t!("setup.credentials.help.option1"),
            t!(
                "setup.credentials.help.option2",
                access_key = ACCESS_KEY_VAR,
                secret_key = SECRET_KEY_VAR
            ),
        ],
        ProvisionError::NameAttemptsExhausted {
            attempts,
            collisions,
        } => {
            let mut lines: Vec<String> = collisions
                .iter()
                .flat_map(|name| {
                    [
                        t!("setup.bucket.creating", bucket = name),
                        t!("setup.bucket.collision", bucket = name),
                    ]
                })
                .collect();
            lines.push(t!("setup.bucket.exhausted", attempts = attempts));
            lines.push(String::new());
            lines.push(t!("setup.failed"));
            lines
        }
        ProvisionError::Create(inner) => {
            vec![t!("setup.bucket.create_failed", error = inner), String::new(), t!("setup.failed")]
        }
        ProvisionError::Invalid(inner) => {
            vec![t!("setup.bucket.invalid", error = inner), String::new(), t!("setup.failed")]
        }
    }
}

/// Renders the confirmation line for an applied setting.
fn setting_line(setting: BucketSetting, config: &UploadKitConfig) -> String {
    match setting {
        BucketSetting::PublicAccessBlock => t!("setup.settings.public_access_block"),
        BucketSetting::Versioning => t!("setup.settings.versioning"),
        BucketSetting::Lifecycle => {
            t!("setup.settings.lifecycle", days = config.provision.expiration_days)
        }
        BucketSetting::Encryption => t!(
            "setup.settings.encryption",
            algorithm = EncryptionAlgorithm::from(config.provision.encryption).as_str()
        ),
    }
}

/// Renders the post-provisioning probe.
fn probe_lines(probe: &ProbeReport) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in ProbeStepKind::ALL {
        match probe.status(kind) {
            Some(StepStatus::Passed) => lines.push(match kind {
                ProbeStepKind::Write => t!("setup.probe.write"),
                ProbeStepKind::Read => t!("setup.probe.read"),
                ProbeStepKind::Presign => t!("setup.probe.presign"),
                ProbeStepKind::Cleanup => t!("setup.probe.cleanup"),
            }),
            Some(StepStatus::Failed(err)) if kind == ProbeStepKind::Cleanup => {
                lines.push(t!("setup.probe.cleanup_failed", error = err));
            }
            Some(StepStatus::Failed(err)) => {
                lines.push(t!("setup.probe.failed", error = err));
                break;
            }
            Some(StepStatus::Skipped) | None => break,
        }
    }
    lines
}

// ============================================================================
// SECTION: Connection Check
// ============================================================================

/// Renders the connection check banner.
#[must_use]
pub fn check_banner_lines(env_file: &str) -> Vec<String> {
    vec![
        t!("check.banner"),
        String::new(),
        t!("check.intro", env_file = env_file),
        String::new(),
        t!("check.source", env_file = env_file),
        String::new(),
    ]
}

/// Renders the missing-variable report and the `.env` template.
#[must_use]
pub fn missing_env_lines(missing: &[&str], env_file: &str) -> Vec<String> {
    let mut lines = vec![t!("check.missing.header")];
    lines.extend(missing.iter().map(|var| t!("check.missing.item", var = var)));
    lines.push(String::new());
    lines.push(t!("check.missing.template_header", env_file = env_file));
    lines.extend(ENV_TEMPLATE.iter().map(|(key, value)| format!("{key}={value}")));
    lines
}

/// Returns the keycap marker for a step number (`1️⃣`).
#[must_use]
pub fn step_marker(number: usize) -> String {
    format!("{number}\u{fe0f}\u{20e3}")
}

/// Renders the executed connection check steps, stopping at the first failure.
#[must_use]
pub fn connection_lines(report: &ConnectionReport, launch_hint: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in ConnectionStepKind::ALL {
        let Some(status) = report.status(kind) else {
            break;
        };
        if matches!(status, StepStatus::Skipped) {
            break;
        }
        if kind != ConnectionStepKind::Credentials {
            lines.push(String::new());
        }
        lines.push(step_header(kind, &report.bucket));
        match status {
            StepStatus::Passed => lines.extend(step_passed_lines(kind, report)),
            StepStatus::Failed(err) => {
                lines.extend(step_failed_lines(kind, err, &report.bucket));
                if kind != ConnectionStepKind::Cleanup {
                    return lines;
                }
            }
            StepStatus::Skipped => {}
        }
    }
    if report.passed() {
        lines.push(String::new());
        lines.push(t!("check.passed"));
        lines.push(t!("check.launch.header"));
        lines.push(t!("check.launch.command", hint = launch_hint, bucket = report.bucket));
    }
    lines
}

/// Renders the closing verdict shared by every exit path of the check.
#[must_use]
pub fn check_outcome_lines(passed: bool, env_file: &str) -> Vec<String> {
    if passed {
        return vec![String::new(), t!("check.ready")];
    }
    vec![
        String::new(),
        t!("check.failed"),
        String::new(),
        t!("check.help.header"),
        t!("check.help.env_file", env_file = env_file),
        t!("check.help.permissions"),
        t!("check.help.bucket"),
    ]
}

/// Renders the "N️⃣ Testing ..." header for a step.
fn step_header(kind: ConnectionStepKind, bucket: &str) -> String {
    let marker = step_marker(kind.number());
    match kind {
        ConnectionStepKind::Credentials => t!("check.step.credentials", marker = marker),
        ConnectionStepKind::Client => t!("check.step.client", marker = marker),
        ConnectionStepKind::Bucket => t!("check.step.bucket", marker = marker, bucket = bucket),
        ConnectionStepKind::Upload => t!("check.step.upload", marker = marker),
        ConnectionStepKind::Download => t!("check.step.download", marker = marker),
        ConnectionStepKind::Presign => t!("check.step.presign", marker = marker),
        ConnectionStepKind::Cleanup => t!("check.step.cleanup", marker = marker),
    }
}

/// Renders the lines for a passed step.
fn step_passed_lines(kind: ConnectionStepKind, report: &ConnectionReport) -> Vec<String> {
    match kind {
        ConnectionStepKind::Credentials => {
            let mut lines = vec![t!("check.credentials.valid")];
            if let Some(identity) = &report.identity {
                lines.push(t!("check.credentials.account", account = identity.account));
                lines.push(t!("check.credentials.arn", arn = identity.arn));
            }
            lines
        }
        ConnectionStepKind::Client => {
            vec![t!("check.client.ok"), t!("check.client.region", region = report.region)]
        }
        ConnectionStepKind::Bucket => vec![t!("check.bucket.ok", bucket = report.bucket)],
        ConnectionStepKind::Upload => vec![t!("check.upload.ok")],
        ConnectionStepKind::Download => vec![t!("check.download.ok")],
        ConnectionStepKind::Presign => {
            let mut lines = vec![t!("check.presign.ok")];
            if let Some(url) = &report.presigned_url {
                lines.push(t!("check.presign.url", url = truncate_url(url, SHORT_URL_CHARS)));
            }
            lines
        }
        ConnectionStepKind::Cleanup => vec![t!("check.cleanup.ok")],
    }
}

/// Renders the lines for a failed step.
fn step_failed_lines(kind: ConnectionStepKind, err: &StorageError, bucket: &str) -> Vec<String> {
    if let Some(line) = credential_error_line(err) {
        return vec![line];
    }
    match (kind, err) {
        (ConnectionStepKind::Credentials | ConnectionStepKind::Client, _) => {
            vec![t!("check.error.other", error = err)]
        }
        (
            ConnectionStepKind::Bucket,
            StorageError::BucketNotFound {
                ..
            },
        ) => vec![t!("check.bucket.not_found", bucket = bucket)],
        (
            ConnectionStepKind::Bucket,
            StorageError::AccessDenied {
                ..
            },
        ) => vec![t!("check.bucket.denied", bucket = bucket), t!("check.bucket.denied_hint")],
        (ConnectionStepKind::Bucket, _) => vec![t!("check.bucket.failed", error = err)],
        (ConnectionStepKind::Upload, _) => vec![t!("check.upload.failed", error = err)],
        (
            ConnectionStepKind::Download,
            StorageError::ContentMismatch {
                ..
            },
        ) => vec![t!("check.download.mismatch")],
        (ConnectionStepKind::Download, _) => vec![t!("check.download.failed", error = err)],
        (ConnectionStepKind::Presign, _) => vec![t!("check.presign.failed", error = err)],
        (ConnectionStepKind::Cleanup, _) => vec![t!("check.cleanup.failed", error = err)],
    }
}

/// Maps credential-class errors to their dedicated messages.
fn credential_error_line(err: &StorageError) -> Option<String> {
    match err {
        StorageError::MissingCredentials {
            ..
        } => Some(t!("check.error.no_credentials")),
        StorageError::InvalidAccessKeyId => Some(t!("check.error.invalid_key")),
        StorageError::SignatureMismatch => Some(t!("check.error.invalid_secret")),
        _ => None,
    }
}

// ============================================================================
// SECTION: MCP Tests
// ============================================================================

/// Renders the tool listing.
#[must_use]
pub fn tool_lines(tools: &[ToolDefinition]) -> Vec<String> {
    let mut lines = vec![t!("mcp.tools.header")];
    for tool in tools {
        let description = tool
            .description
            .as_deref()
            .map_or_else(|| t!("mcp.tools.no_description"), str::to_string);
        lines.push(t!("mcp.tools.item", name = tool.name, description = description));
    }
    lines
}

/// Renders the smoke test result.
#[must_use]
pub fn smoke_result_lines(result: &UploadResult, bucket: &str) -> Vec<String> {
    let rendered = serde_json::to_string(result).unwrap_or_else(|_| result.s3_key.clone());
    vec![
        t!("mcp.upload.ok"),
        t!("mcp.upload.result", result = rendered),
        t!("mcp.upload.url", url = truncate_url(&result.url, SHORT_URL_CHARS)),
        t!("mcp.upload.size", size = group_thousands(result.size)),
        t!("mcp.upload.mime", mime_type = result.mime_type),
        t!("mcp.upload.key", key = result.s3_key),
        t!("mcp.upload.bucket", bucket = bucket),
    ]
}

/// Renders the progress test result.
#[must_use]
pub fn progress_result_lines(result: &UploadResult, bucket: &str) -> Vec<String> {
    vec![
        String::new(),
        t!("mcp.progress.done"),
        t!("mcp.progress.url", url = truncate_url(&result.url, PROGRESS_URL_CHARS)),
        t!("mcp.progress.size", size = group_thousands(result.size)),
        t!("mcp.progress.bucket", bucket = bucket),
    ]
}

/// Renders one in-place progress frame (without the leading `\r`).
#[must_use]
pub fn progress_line(update: &ProgressUpdate, bar: ProgressBar) -> String {
    let frame = bar.render(update);
    t!(
        "mcp.progress.line",
        label = frame.label(),
        message = update.message.as_deref().unwrap_or_default()
    )
}
