// crates/upload-kit-config/src/config.rs
// ============================================================================
// Module: Upload Kit Tool Configuration
// Description: TOML configuration loading and validation for Upload Kit.
// Purpose: Provide strict config parsing with hard limits and sane defaults.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Tool configuration is loaded from `upload-kit.toml`. The path comes from
//! the CLI, then the `UPLOAD_KIT_CONFIG` environment variable, then the
//! default filename. An explicitly named file must exist; a missing default
//! file yields built-in defaults. Every section is validated before use.
//! Security posture: config inputs are untrusted; size and path limits apply.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "upload-kit.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "UPLOAD_KIT_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum bucket name length accepted by S3.
pub const MAX_BUCKET_NAME_LENGTH: usize = 63;
/// Maximum presigned URL lifetime (SigV4 limit of seven days).
pub const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;
/// Maximum random suffix length for generated bucket names (UUID hex digits).
pub const MAX_SUFFIX_LEN: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for CLI error mapping and tests.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root Upload Kit configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UploadKitConfig {
    /// Bucket provisioning settings.
    #[serde(default)]
    pub provision: ProvisionConfig,
    /// Access probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,
    /// Object-store endpoint settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// MCP server launch settings.
    #[serde(default)]
    pub mcp: McpConfig,
}

impl UploadKitConfig {
    /// Loads configuration from disk, falling back to defaults when the
    /// implicit default file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicit file is missing, the file is
    /// unreadable or invalid, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            tracing::debug!(path = %resolved.display(), "config file absent; using defaults");
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml(content)?;
        tracing::debug!(path = %resolved.display(), "loaded config file");
        Ok(config)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any section is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provision.validate()?;
        self.probe.validate()?;
        self.storage.validate()?;
        self.mcp.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Provisioning
// ============================================================================

/// Default server-side encryption applied to provisioned buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionMode {
    /// AES256 (SSE-S3).
    #[default]
    Aes256,
    /// KMS-managed encryption (SSE-KMS) with the account default key.
    AwsKms,
}

/// Bucket provisioning settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvisionConfig {
    /// Prefix of generated bucket names.
    #[serde(default = "default_bucket_prefix")]
    pub bucket_prefix: String,
    /// Random suffix length (hex characters).
    #[serde(default = "default_suffix_len")]
    pub suffix_len: usize,
    /// Maximum bucket-name generation attempts on global name collisions.
    #[serde(default = "default_max_name_attempts")]
    pub max_name_attempts: u32,
    /// Region used when neither the environment nor storage config names one.
    #[serde(default = "default_region")]
    pub default_region: String,
    /// Lifecycle rule identifier.
    #[serde(default = "default_lifecycle_rule_id")]
    pub lifecycle_rule_id: String,
    /// Days after which current objects expire.
    #[serde(default = "default_expiration_days")]
    pub expiration_days: i32,
    /// Days after which noncurrent object versions expire.
    #[serde(default = "default_noncurrent_expiration_days")]
    pub noncurrent_expiration_days: i32,
    /// Default encryption algorithm.
    #[serde(default)]
    pub encryption: EncryptionMode,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            bucket_prefix: default_bucket_prefix(),
            suffix_len: default_suffix_len(),
            max_name_attempts: default_max_name_attempts(),
            default_region: default_region(),
            lifecycle_rule_id: default_lifecycle_rule_id(),
            expiration_days: default_expiration_days(),
            noncurrent_expiration_days: default_noncurrent_expiration_days(),
            encryption: EncryptionMode::default(),
        }
    }
}

impl ProvisionConfig {
    /// Validates provisioning settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when generated names could be invalid or limits are zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.bucket_prefix.as_str();
        if prefix.is_empty() {
            return Err(ConfigError::Invalid("provision.bucket_prefix must be set".to_string()));
        }
        if !prefix.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-') {
            return Err(ConfigError::Invalid(
                "provision.bucket_prefix may only contain lowercase letters, digits, and hyphens"
                    .to_string(),
            ));
        }
        if !prefix.as_bytes()[0].is_ascii_alphanumeric() {
            return Err(ConfigError::Invalid(
                "provision.bucket_prefix must start with a letter or digit".to_string(),
            ));
        }
        if self.suffix_len == 0 || self.suffix_len > MAX_SUFFIX_LEN {
            return Err(ConfigError::Invalid(format!(
                "provision.suffix_len must be between 1 and {MAX_SUFFIX_LEN}"
            )));
        }
        let total = prefix.len() + 1 + self.suffix_len;
        if total > MAX_BUCKET_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!(
                "generated bucket names would be {total} characters (max \
                 {MAX_BUCKET_NAME_LENGTH})"
            )));
        }
        if self.max_name_attempts == 0 {
            return Err(ConfigError::Invalid(
                "provision.max_name_attempts must be greater than zero".to_string(),
            ));
        }
        if self.default_region.trim().is_empty() {
            return Err(ConfigError::Invalid("provision.default_region must be set".to_string()));
        }
        if self.lifecycle_rule_id.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "provision.lifecycle_rule_id must be set".to_string(),
            ));
        }
        if self.expiration_days < 1 || self.noncurrent_expiration_days < 1 {
            return Err(ConfigError::Invalid(
                "provision expiration days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Probe
// ============================================================================

/// Access probe settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// Presigned URL lifetime in seconds.
    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: u64,
    /// Maximum bytes read back from a probe object.
    #[serde(default = "default_max_object_bytes")]
    pub max_object_bytes: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            presign_expiry_secs: default_presign_expiry_secs(),
            max_object_bytes: default_max_object_bytes(),
        }
    }
}

impl ProbeConfig {
    /// Returns the presign lifetime as a [`Duration`].
    #[must_use]
    pub const fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs)
    }

    /// Validates probe settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when limits are out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.presign_expiry_secs == 0 || self.presign_expiry_secs > MAX_PRESIGN_EXPIRY_SECS {
            return Err(ConfigError::Invalid(format!(
                "probe.presign_expiry_secs must be between 1 and {MAX_PRESIGN_EXPIRY_SECS}"
            )));
        }
        if self.max_object_bytes == 0 {
            return Err(ConfigError::Invalid(
                "probe.max_object_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Storage
// ============================================================================

/// Object-store endpoint settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Optional region override (wins over the environment).
    #[serde(default)]
    pub region: Option<String>,
    /// Optional object-store endpoint (S3-compatible).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Force path-style addressing (S3-compatible).
    #[serde(default)]
    pub force_path_style: bool,
    /// Allow non-TLS endpoints (explicit opt-in).
    #[serde(default)]
    pub allow_http: bool,
}

impl StorageConfig {
    /// Validates object-store settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the endpoint or region is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(region) = &self.region
            && region.trim().is_empty()
        {
            return Err(ConfigError::Invalid("storage.region must be non-empty".to_string()));
        }
        if let Some(endpoint) = &self.endpoint {
            let trimmed = endpoint.trim();
            if !(trimmed.starts_with("https://") || trimmed.starts_with("http://")) {
                return Err(ConfigError::Invalid(
                    "storage.endpoint must include http:// or https://".to_string(),
                ));
            }
            if trimmed.starts_with("http://") && !self.allow_http {
                return Err(ConfigError::Invalid(
                    "storage.endpoint uses http:// without storage.allow_http".to_string(),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: MCP
// ============================================================================

/// Stdio message framing used by the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpFraming {
    /// One JSON message per line (MCP stdio standard).
    #[default]
    Newline,
    /// `Content-Length` header framing.
    ContentLength,
}

/// MCP server launch settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct McpConfig {
    /// Server command to spawn.
    #[serde(default = "default_mcp_command")]
    pub command: String,
    /// Server arguments (the upload root is appended as `--root <dir>`).
    #[serde(default = "default_mcp_args")]
    pub args: Vec<String>,
    /// Directory the server is allowed to upload from (`~` expands to `HOME`).
    #[serde(default = "default_upload_root")]
    pub upload_root: String,
    /// Dotenv file passed through to the server environment.
    #[serde(default = "default_env_file")]
    pub env_file: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Stdio framing.
    #[serde(default)]
    pub framing: McpFraming,
    /// Upload tool name.
    #[serde(default = "default_upload_tool")]
    pub upload_tool: String,
    /// Presigned URL lifetime requested from the upload tool.
    #[serde(default = "default_presign_expiry_secs")]
    pub expires_in: u64,
    /// Command shown after provisioning for launching the upload server.
    #[serde(default = "default_launch_hint")]
    pub launch_hint: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            command: default_mcp_command(),
            args: default_mcp_args(),
            upload_root: default_upload_root(),
            env_file: default_env_file(),
            timeout_ms: default_timeout_ms(),
            framing: McpFraming::default(),
            upload_tool: default_upload_tool(),
            expires_in: default_presign_expiry_secs(),
            launch_hint: default_launch_hint(),
        }
    }
}

impl McpConfig {
    /// Returns the request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Expands the upload root, resolving a leading `~` against `home`.
    #[must_use]
    pub fn upload_root_with_home(&self, home: Option<&Path>) -> PathBuf {
        expand_tilde(&self.upload_root, home)
    }

    /// Validates MCP settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when required fields are empty or out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command.trim().is_empty() {
            return Err(ConfigError::Invalid("mcp.command must be set".to_string()));
        }
        if self.upload_tool.trim().is_empty() {
            return Err(ConfigError::Invalid("mcp.upload_tool must be set".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("mcp.timeout_ms must be greater than zero".to_string()));
        }
        if self.expires_in == 0 || self.expires_in > MAX_PRESIGN_EXPIRY_SECS {
            return Err(ConfigError::Invalid(format!(
                "mcp.expires_in must be between 1 and {MAX_PRESIGN_EXPIRY_SECS}"
            )));
        }
        validate_path_string("mcp.upload_root", &self.upload_root)?;
        validate_path_string("mcp.env_file", &self.env_file)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default bucket prefix.
fn default_bucket_prefix() -> String {
    "mcp-uploads".to_string()
}

/// Default random suffix length.
const fn default_suffix_len() -> usize {
    8
}

/// Default name attempts.
const fn default_max_name_attempts() -> u32 {
    5
}

/// Default region.
fn default_region() -> String {
    crate::env::DEFAULT_REGION.to_string()
}

/// Default lifecycle rule id.
fn default_lifecycle_rule_id() -> String {
    "DeleteOldUploads".to_string()
}

/// Default current-object expiration.
const fn default_expiration_days() -> i32 {
    30
}

/// Default noncurrent-version expiration.
const fn default_noncurrent_expiration_days() -> i32 {
    7
}

/// Default presign lifetime (one hour).
const fn default_presign_expiry_secs() -> u64 {
    3600
}

/// Default probe read limit.
const fn default_max_object_bytes() -> usize {
    1024 * 1024
}

/// Default server command.
fn default_mcp_command() -> String {
    "python".to_string()
}

/// Default server arguments.
fn default_mcp_args() -> Vec<String> {
    vec!["mcp_s3.py".to_string()]
}

/// Default upload root.
fn default_upload_root() -> String {
    "~/mcp-uploads".to_string()
}

/// Default dotenv file.
fn default_env_file() -> String {
    crate::env::DEFAULT_ENV_FILE.to_string()
}

/// Default request timeout (uploads can be slow).
const fn default_timeout_ms() -> u64 {
    120_000
}

/// Default upload tool name.
fn default_upload_tool() -> String {
    "upload_file".to_string()
}

/// Default server launch hint.
fn default_launch_hint() -> String {
    "python mcp_box.py".to_string()
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag reports whether it was named explicitly.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Expands a leading `~` or `~/` against `home`; other paths are returned as-is.
#[must_use]
pub fn expand_tilde(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (value, Some(home)) if value.starts_with("~/") => home.join(&value[2 ..]),
        (value, _) => PathBuf::from(value),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
