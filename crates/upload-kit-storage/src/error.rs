// crates/upload-kit-storage/src/error.rs
// ============================================================================
// Module: Storage Errors
// Description: Classified storage failures and backend error mapping.
// Purpose: Turn SDK error codes and HTTP statuses into actionable variants.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Backends describe a failure as [`ErrorFacts`] (service code, HTTP status,
//! rendered message, whether the service answered at all) and [`classify`]
//! maps those facts onto a [`StorageError`]. Head requests carry no error
//! body, so bare `404`/`403` statuses are classified as well.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Classified storage errors.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
/// - String payloads may include untrusted backend text.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageError {
    /// No credentials could be resolved.
    #[error("storage credentials not found: {detail}")]
    MissingCredentials {
        /// Backend detail.
        detail: String,
    },
    /// The access key id is unknown to the service.
    #[error("invalid access key id")]
    InvalidAccessKeyId,
    /// The request signature did not match (wrong secret key).
    #[error("request signature does not match (check the secret access key)")]
    SignatureMismatch,
    /// The bucket name is taken by another account.
    #[error("bucket name {bucket} already exists")]
    BucketAlreadyExists {
        /// Bucket name.
        bucket: String,
    },
    /// The bucket already exists and is owned by the caller.
    #[error("bucket {bucket} is already owned by you")]
    BucketAlreadyOwned {
        /// Bucket name.
        bucket: String,
    },
    /// The bucket does not exist.
    #[error("bucket {bucket} does not exist")]
    BucketNotFound {
        /// Bucket name.
        bucket: String,
    },
    /// Access was denied.
    #[error("access denied to bucket {bucket}")]
    AccessDenied {
        /// Bucket name.
        bucket: String,
    },
    /// Read-back content differed from what was written.
    #[error("object {key} content mismatch ({expected} bytes written, {actual} bytes read)")]
    ContentMismatch {
        /// Object key.
        key: String,
        /// Bytes written.
        expected: usize,
        /// Bytes read back.
        actual: usize,
    },
    /// Object exceeds the read limit.
    #[error("object too large: {key} ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Object key.
        key: String,
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual size in bytes.
        actual_bytes: usize,
    },
    /// Invalid request input.
    #[error("storage request invalid: {message}")]
    Invalid {
        /// Detail message.
        message: String,
    },
    /// Local I/O failure.
    #[error("storage io error: {message}")]
    Io {
        /// Detail message.
        message: String,
    },
    /// Any other backend failure.
    #[error("storage backend error{}: {message}", code_suffix(.code.as_deref()))]
    Backend {
        /// Service error code, when one was returned.
        code: Option<String>,
        /// Rendered backend message.
        message: String,
    },
}

impl StorageError {
    /// Builds an [`StorageError::Invalid`] error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Builds an [`StorageError::Io`] error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }
}

/// Renders the optional service code for [`StorageError::Backend`] messages.
fn code_suffix(code: Option<&str>) -> String {
    code.map(|code| format!(" ({code})")).unwrap_or_default()
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Backend-neutral description of a failed storage call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorFacts {
    /// Service error code (for example `NoSuchBucket`).
    pub code: Option<String>,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Rendered error message with context.
    pub message: String,
    /// True when the service answered (as opposed to a local or transport failure).
    pub service: bool,
}

/// Classifies a failed call against `bucket`.
#[must_use]
pub fn classify(facts: ErrorFacts, bucket: &str) -> StorageError {
    let bucket = bucket.to_string();
    match facts.code.as_deref() {
        Some("InvalidAccessKeyId") => return StorageError::InvalidAccessKeyId,
        Some("SignatureDoesNotMatch") => return StorageError::SignatureMismatch,
        Some("BucketAlreadyExists") => {
            return StorageError::BucketAlreadyExists {
                bucket,
            };
        }
        Some("BucketAlreadyOwnedByYou") => {
            return StorageError::BucketAlreadyOwned {
                bucket,
            };
        }
        Some("NoSuchBucket" | "NotFound") => {
            return StorageError::BucketNotFound {
                bucket,
            };
        }
        Some("AccessDenied" | "Forbidden" | "AllAccessDisabled") => {
            return StorageError::AccessDenied {
                bucket,
            };
        }
        _ => {}
    }
    if facts.code.is_none() {
        match facts.status {
            Some(404) => {
                return StorageError::BucketNotFound {
                    bucket,
                };
            }
            Some(403) => {
                return StorageError::AccessDenied {
                    bucket,
                };
            }
            _ => {}
        }
    }
    if !facts.service && facts.message.to_ascii_lowercase().contains("credential") {
        return StorageError::MissingCredentials {
            detail: facts.message,
        };
    }
    StorageError::Backend {
        code: facts.code,
        message: facts.message,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
