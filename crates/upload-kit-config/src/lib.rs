// crates/upload-kit-config/src/lib.rs
// ============================================================================
// Module: Upload Kit Configuration Library
// Description: Environment and tool configuration for the Upload Kit CLI.
// Purpose: Resolve credentials from `.env` files and load TOML tool settings.
// Dependencies: dotenvy, serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Two configuration surfaces feed the Upload Kit tools:
//! - [`env`]: the four storage variables (access key, secret key, region,
//!   bucket) layered from the process environment over a `.env` file.
//! - [`config`]: the optional `upload-kit.toml` file carrying provisioning,
//!   probe, storage endpoint, and MCP server launch settings.
//!
//! Security posture: configuration inputs are untrusted; loaders enforce
//! size and path limits and secrets never appear in `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::EncryptionMode;
pub use config::McpConfig;
pub use config::McpFraming;
pub use config::ProbeConfig;
pub use config::ProvisionConfig;
pub use config::StorageConfig;
pub use config::UploadKitConfig;
pub use env::DotEnv;
pub use env::EnvError;
pub use env::EnvLayer;
pub use env::UploadEnv;
