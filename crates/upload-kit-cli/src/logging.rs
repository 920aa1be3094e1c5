// crates/upload-kit-cli/src/logging.rs
// ============================================================================
// Module: Diagnostic Logging
// Description: `tracing` subscriber setup for the CLI.
// Purpose: Route diagnostics to stderr without mixing them into command output.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! User-facing progress lines go to stdout through the message catalog.
//! Diagnostics emitted by the libraries with `tracing` go to stderr, filtered
//! by `-v` count or by the [`LOG_ENV`] directive string when it is set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding an explicit filter directive.
pub const LOG_ENV: &str = "UPLOAD_KIT_LOG";

/// Third-party targets capped at `warn` unless overridden.
const NOISY_TARGETS: &[&str] = &[
    "aws_config",
    "aws_smithy_runtime",
    "aws_sdk_s3",
    "aws_sdk_sts",
    "hyper",
    "reqwest",
    "rustls",
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Logging setup failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {message}")]
    Filter {
        /// Offending directive string.
        directive: String,
        /// Parser message.
        message: String,
    },
    /// A global subscriber was already installed.
    #[error("{0}")]
    Init(String),
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Maps `-v` occurrences to a base level.
#[must_use]
pub const fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Builds the filter for `verbosity`, or from `env_value` when set.
///
/// # Errors
///
/// Returns [`LoggingError::Filter`] when the directive string is invalid.
pub fn build_env_filter(verbosity: u8, env_value: Option<&str>) -> Result<EnvFilter, LoggingError> {
    let directive = match env_value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(explicit) => explicit.to_string(),
        None => {
            let mut directives = vec![level_for(verbosity).to_string()];
            if verbosity < 3 {
                directives.extend(NOISY_TARGETS.iter().map(|target| format!("{target}=warn")));
            }
            directives.join(",")
        }
    };
    EnvFilter::try_new(&directive).map_err(|err| LoggingError::Filter {
        directive,
        message: err.to_string(),
    })
}

/// Installs the global stderr subscriber.
///
/// # Errors
///
/// Returns [`LoggingError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init(verbosity: u8) -> Result<(), LoggingError> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_env_filter(verbosity, env_value.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}
