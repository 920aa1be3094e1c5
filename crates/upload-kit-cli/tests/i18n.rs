// crates/upload-kit-cli/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Exercises the translation catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable i18n helpers.
// Dependencies: upload-kit-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! Validates the Upload Kit CLI i18n catalog behavior:
//! - Message arguments capture key/value substitutions.
//! - Translation falls back to keys on misses.
//! - The [`t!`](upload_kit_cli::t) macro formats placeholders correctly.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use upload_kit_cli::i18n::MessageArg;
use upload_kit_cli::i18n::translate;
use upload_kit_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms message arguments capture key/value pairs.
#[test]
fn message_arg_new_captures_key_and_value() {
    let arg = MessageArg::new("bucket", "mcp-uploads-1a2b3c4d");
    assert_eq!(arg.key, "bucket");
    assert_eq!(arg.value, "mcp-uploads-1a2b3c4d");
}

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![MessageArg::new("bucket", "mcp-uploads-1a2b3c4d")];
    let result = translate("setup.bucket_name", args);
    assert_eq!(result, "📋 Bucket name: mcp-uploads-1a2b3c4d");
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    let result = translate("missing.key", Vec::new());
    assert_eq!(result, "missing.key");
}

/// Confirms the t! macro formats named arguments.
#[test]
fn t_macro_formats_message() {
    let rendered = t!("main.version", version = "0.1.0");
    assert_eq!(rendered, "upload-kit 0.1.0");
}

/// Confirms repeated placeholders are all substituted.
#[test]
fn t_macro_substitutes_every_occurrence() {
    let rendered = t!("check.step.bucket", marker = "3\u{fe0f}\u{20e3}", bucket = "uploads");
    assert_eq!(rendered, "3\u{fe0f}\u{20e3} Testing access to bucket 'uploads'...");
}
