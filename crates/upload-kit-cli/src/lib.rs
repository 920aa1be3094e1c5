// crates/upload-kit-cli/src/lib.rs
// ============================================================================
// Module: Upload Kit CLI Library
// Description: Shared helpers for the `upload-kit` binary.
// Purpose: Expose localization, logging, fixtures, and report rendering.
// Dependencies: upload-kit-config, upload-kit-mcp, upload-kit-storage, tracing
// ============================================================================

//! ## Overview
//! The binary in `main.rs` is a thin dispatcher. Everything it prints is
//! rendered here so the text can be tested without spawning a process:
//! [`report`] turns workflow reports into localized lines, [`fixture`] owns
//! the temporary upload files used by the MCP smoke tests, and [`logging`]
//! installs the diagnostic subscriber on stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod fixture;
pub mod i18n;
pub mod logging;
pub mod report;
