// crates/upload-kit-mcp/src/upload.rs
// ============================================================================
// Module: Upload Tool Model
// Description: Arguments and result of the server's file upload tool.
// Purpose: Give the upload tool call a typed surface.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The upload server exposes `upload_file`, taking a path relative to its
//! upload root and a presigned URL lifetime, and returning the presigned URL,
//! object size, MIME type, and object key. Some servers wrap the payload in a
//! `result` object; [`UploadResult::from_tool_value`] accepts both shapes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::client::McpClient;
use crate::client::McpClientError;
use crate::client::ProgressHandler;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default upload tool name.
pub const UPLOAD_TOOL_NAME: &str = "upload_file";

// ============================================================================
// SECTION: Types
// ============================================================================

/// `upload_file` arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadRequest {
    /// Path relative to the server's upload root.
    pub local_path: String,
    /// Presigned URL lifetime in seconds.
    pub expires_in: u64,
}

/// `upload_file` result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UploadResult {
    /// Presigned download URL.
    pub url: String,
    /// Uploaded size in bytes.
    pub size: u64,
    /// Detected MIME type.
    pub mime_type: String,
    /// Object key in the bucket.
    pub s3_key: String,
}

impl UploadResult {
    /// Parses a tool payload, unwrapping a `result` wrapper when present.
    ///
    /// # Errors
    ///
    /// Returns [`McpClientError::Json`] when required fields are missing.
    pub fn from_tool_value(value: Value) -> Result<Self, McpClientError> {
        let value = match value {
            Value::Object(mut map) if !map.contains_key("url") && map.contains_key("result") => {
                map.remove("result").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(value)
            .map_err(|err| McpClientError::Json(format!("invalid upload result: {err}")))
    }
}

// ============================================================================
// SECTION: Calls
// ============================================================================

/// Calls the upload tool and parses its result.
///
/// # Errors
///
/// Returns [`McpClientError`] when the call fails or the result is malformed.
pub async fn upload_file(
    client: &mut McpClient,
    tool_name: &str,
    request: &UploadRequest,
    on_progress: Option<ProgressHandler<'_>>,
) -> Result<UploadResult, McpClientError> {
    let arguments = serde_json::to_value(request)
        .map_err(|err| McpClientError::Json(format!("upload arguments: {err}")))?;
    let value = match on_progress {
        Some(handler) => client.call_tool_with_progress(tool_name, arguments, handler).await?,
        None => client.call_tool(tool_name, arguments).await?,
    };
    let result = UploadResult::from_tool_value(value)?;
    tracing::info!(key = %result.s3_key, size = result.size, "upload tool succeeded");
    Ok(result)
}

// ============================================================================
// SECTION: Formatting
// ============================================================================

/// Returns the first `max_chars` characters of `url` followed by `...`.
#[must_use]
pub fn truncate_url(url: &str, max_chars: usize) -> String {
    let head: String = url.chars().take(max_chars).collect();
    format!("{head}...")
}

/// Formats a byte count with `,` thousands separators.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
