// crates/upload-kit-storage/src/naming.rs
// ============================================================================
// Module: Bucket Naming
// Description: Random bucket name generation and S3 naming rules.
// Purpose: Produce globally unique candidate names that S3 will accept.
// Dependencies: uuid
// ============================================================================

//! ## Overview
//! Bucket names share one global namespace, so provisioning appends a random
//! hex suffix taken from a v4 UUID to a fixed prefix. Collisions are still
//! possible and handled by the provisioner.

// ============================================================================
// SECTION: Imports
// ============================================================================

use upload_kit_config::ProvisionConfig;
use uuid::Uuid;

use crate::error::StorageError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LENGTH: usize = 3;
/// Maximum bucket name length.
const MAX_BUCKET_NAME_LENGTH: usize = 63;
/// Hex digits in a simple-formatted UUID.
const UUID_HEX_DIGITS: usize = 32;

// ============================================================================
// SECTION: Namer
// ============================================================================

/// Generates `prefix-<hex>` bucket names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketNamer {
    /// Fixed name prefix.
    prefix: String,
    /// Number of hex characters appended.
    suffix_len: usize,
}

impl BucketNamer {
    /// Creates a namer, rejecting configurations that yield invalid names.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Invalid`] when the suffix length is out of
    /// range or the resulting names break S3 naming rules.
    pub fn new(prefix: impl Into<String>, suffix_len: usize) -> Result<Self, StorageError> {
        let prefix = prefix.into();
        if suffix_len == 0 || suffix_len > UUID_HEX_DIGITS {
            return Err(StorageError::invalid(format!(
                "bucket suffix length must be between 1 and {UUID_HEX_DIGITS}"
            )));
        }
        validate_bucket_name(&format!("{prefix}-{}", "0".repeat(suffix_len)))?;
        Ok(Self {
            prefix,
            suffix_len,
        })
    }

    /// Builds a namer from provisioning config.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Invalid`] when the config yields invalid names.
    pub fn from_config(config: &ProvisionConfig) -> Result<Self, StorageError> {
        Self::new(config.bucket_prefix.clone(), config.suffix_len)
    }

    /// Generates a fresh candidate name.
    #[must_use]
    pub fn generate(&self) -> String {
        let hex = Uuid::new_v4().simple().to_string();
        let suffix: String = hex.chars().take(self.suffix_len).collect();
        format!("{}-{suffix}", self.prefix)
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Checks a bucket name against S3 naming rules.
///
/// # Errors
///
/// Returns [`StorageError::Invalid`] describing the first broken rule.
pub fn validate_bucket_name(name: &str) -> Result<(), StorageError> {
    let len = name.len();
    if !(MIN_BUCKET_NAME_LENGTH ..= MAX_BUCKET_NAME_LENGTH).contains(&len) {
        return Err(StorageError::invalid(format!(
            "bucket name {name} must be {MIN_BUCKET_NAME_LENGTH}-{MAX_BUCKET_NAME_LENGTH} \
             characters"
        )));
    }
    if !name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(StorageError::invalid(format!(
            "bucket name {name} may only contain lowercase letters, digits, hyphens, and dots"
        )));
    }
    let edges_ok = name.bytes().next().is_some_and(|b| b.is_ascii_alphanumeric())
        && name.bytes().last().is_some_and(|b| b.is_ascii_alphanumeric());
    if !edges_ok {
        return Err(StorageError::invalid(format!(
            "bucket name {name} must start and end with a letter or digit"
        )));
    }
    if name.contains("..") {
        return Err(StorageError::invalid(format!(
            "bucket name {name} must not contain consecutive dots"
        )));
    }
    if name.parse::<std::net::Ipv4Addr>().is_ok() {
        return Err(StorageError::invalid(format!(
            "bucket name {name} must not be formatted as an IP address"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test-only assertions.")]
mod tests {
    use super::*;

    #[test]
    fn generated_names_use_prefix_and_hex_suffix() {
        let namer = BucketNamer::new("mcp-uploads", 8).unwrap();
        let name = namer.generate();
        let suffix = name.strip_prefix("mcp-uploads-").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
        validate_bucket_name(&name).unwrap();
    }

    #[test]
    fn namer_rejects_overlong_names() {
        assert!(BucketNamer::new("a".repeat(60), 8).is_err());
        assert!(BucketNamer::new("mcp", 0).is_err());
        assert!(BucketNamer::new("mcp", 33).is_err());
    }

    #[test]
    fn validation_rejects_rule_breakers() {
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name("Upper-case").is_err());
        assert!(validate_bucket_name("-leading").is_err());
        assert!(validate_bucket_name("trailing-").is_err());
        assert!(validate_bucket_name("double..dot").is_err());
        assert!(validate_bucket_name("192.168.1.10").is_err());
        assert!(validate_bucket_name("under_score").is_err());
        assert!(validate_bucket_name("mcp-uploads-1a2b3c4d").is_ok());
        assert!(validate_bucket_name("logs.example.com").is_ok());
    }
}
