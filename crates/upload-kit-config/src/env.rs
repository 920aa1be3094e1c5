// crates/upload-kit-config/src/env.rs
// ============================================================================
// Module: Environment Resolution
// Description: `.env` loading and required storage variable validation.
// Purpose: Resolve storage credentials with process env taking precedence.
// Dependencies: dotenvy, thiserror
// ============================================================================

//! ## Overview
//! A [`DotEnv`] file is read once and layered under a snapshot of the process
//! environment ([`EnvLayer`]). The process environment always wins; the file
//! only fills variables that are unset or empty. [`UploadEnv::resolve`]
//! reports every missing required variable at once so operators can fix the
//! file in a single pass.
//!
//! ## Invariants
//! - Empty values are treated as absent.
//! - A missing `.env` file is not an error; a malformed one is.
//! - The secret access key is redacted from `Debug` output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Access key variable name.
pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
/// Secret key variable name.
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
/// Region variable name.
pub const REGION_VAR: &str = "AWS_DEFAULT_REGION";
/// Bucket name variable name.
pub const BUCKET_VAR: &str = "S3_BUCKET_NAME";
/// Region used when [`REGION_VAR`] is unset.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Default dotenv filename.
pub const DEFAULT_ENV_FILE: &str = ".env";
/// Maximum accepted dotenv file size in bytes.
const MAX_ENV_FILE_BYTES: u64 = 256 * 1024;

/// Template lines shown to operators when variables are missing.
pub const ENV_TEMPLATE: &[(&str, &str)] = &[
    (ACCESS_KEY_VAR, "your_access_key_here"),
    (SECRET_KEY_VAR, "your_secret_key_here"),
    (REGION_VAR, DEFAULT_REGION),
    (BUCKET_VAR, "your_bucket_name_here"),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Environment resolution errors.
///
/// # Invariants
/// - `Missing` lists variables in a stable order (access key, secret key, bucket).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    /// One or more required variables are unset.
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    /// The dotenv file could not be read.
    #[error("env file io error: {0}")]
    Io(String),
    /// The dotenv file could not be parsed.
    #[error("env file parse error: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: DotEnv
// ============================================================================

/// Ordered key/value pairs read from a dotenv file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DotEnv {
    /// Parsed entries in file order (later duplicates replace earlier ones).
    entries: Vec<(String, String)>,
}

impl std::fmt::Debug for DotEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.entries.iter().map(|(key, _)| key.as_str()).collect();
        f.debug_struct("DotEnv").field("keys", &keys).finish()
    }
}

impl DotEnv {
    /// Loads a dotenv file. A missing file yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError`] when the file is unreadable, too large, or malformed.
    pub fn load(path: &Path) -> Result<Self, EnvError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > MAX_ENV_FILE_BYTES => {
                return Err(EnvError::Io(format!(
                    "{} exceeds size limit ({} > {MAX_ENV_FILE_BYTES})",
                    path.display(),
                    meta.len()
                )));
            }
            Ok(_) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "env file not found; using process env only");
                return Ok(Self::default());
            }
            Err(err) => return Err(EnvError::Io(err.to_string())),
        }
        let iter = dotenvy::from_path_iter(path).map_err(|err| EnvError::Io(err.to_string()))?;
        let mut entries: Vec<(String, String)> = Vec::new();
        for item in iter {
            let (key, value) = item.map_err(|err| EnvError::Parse(err.to_string()))?;
            entries.retain(|(existing, _)| existing != &key);
            entries.push((key, value));
        }
        tracing::debug!(path = %path.display(), count = entries.len(), "loaded env file");
        Ok(Self {
            entries,
        })
    }

    /// Builds a dotenv set from explicit pairs.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = Vec::new();
        for (key, value) in pairs {
            let key = key.into();
            entries.retain(|(existing, _)| existing != &key);
            entries.push((key, value.into()));
        }
        Self {
            entries,
        }
    }

    /// Returns the value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
    }

    /// Returns the parsed pairs in file order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Returns true when the file contributed no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// SECTION: Env Layer
// ============================================================================

/// Process environment layered over a dotenv file.
#[derive(Clone, Default)]
pub struct EnvLayer {
    /// Snapshot of process variables.
    process: BTreeMap<String, String>,
    /// Dotenv fallback values.
    dotenv: DotEnv,
}

impl std::fmt::Debug for EnvLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvLayer")
            .field("process_vars", &self.process.len())
            .field("dotenv", &self.dotenv)
            .finish()
    }
}

impl EnvLayer {
    /// Builds a layer from explicit process pairs and a dotenv set.
    #[must_use]
    pub fn new<K, V>(process: impl IntoIterator<Item = (K, V)>, dotenv: DotEnv) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            process: process.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
            dotenv,
        }
    }

    /// Builds a layer from raw OS pairs, skipping pairs that are not UTF-8.
    #[must_use]
    pub fn from_os_pairs(
        process: impl IntoIterator<Item = (OsString, OsString)>,
        dotenv: DotEnv,
    ) -> Self {
        let process = process
            .into_iter()
            .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    let key = key.unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
                    tracing::debug!(key = %key, "skipping non-UTF-8 environment variable");
                    None
                }
            })
            .collect();
        Self {
            process,
            dotenv,
        }
    }

    /// Snapshots the current process environment over `dotenv`.
    #[must_use]
    pub fn from_process(dotenv: DotEnv) -> Self {
        Self::from_os_pairs(std::env::vars_os(), dotenv)
    }

    /// Looks up a variable; process values win and empty values count as unset.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let process = self.process.get(key).map(String::as_str).filter(|value| !value.is_empty());
        process.or_else(|| self.dotenv.get(key).filter(|value| !value.is_empty()))
    }

    /// Returns the dotenv layer (used to seed server subprocess environments).
    #[must_use]
    pub const fn dotenv(&self) -> &DotEnv {
        &self.dotenv
    }

    /// Resolves the bucket name alone.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Missing`] when the bucket variable is unset.
    pub fn bucket_name(&self) -> Result<String, EnvError> {
        self.get(BUCKET_VAR).map(str::to_string).ok_or_else(|| EnvError::Missing(vec![BUCKET_VAR]))
    }
}

// ============================================================================
// SECTION: Upload Env
// ============================================================================

/// Resolved storage credentials and target bucket.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadEnv {
    /// Access key identifier.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
    /// Region (defaults to [`DEFAULT_REGION`]).
    pub region: String,
    /// Target bucket name.
    pub bucket_name: String,
}

impl std::fmt::Debug for UploadEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadEnv")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket_name", &self.bucket_name)
            .finish()
    }
}

impl UploadEnv {
    /// Resolves all storage variables from `layer`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Missing`] naming every unset required variable.
    pub fn resolve(layer: &EnvLayer) -> Result<Self, EnvError> {
        let access_key = layer.get(ACCESS_KEY_VAR);
        let secret_key = layer.get(SECRET_KEY_VAR);
        let bucket = layer.get(BUCKET_VAR);
        let mut missing = Vec::new();
        if access_key.is_none() {
            missing.push(ACCESS_KEY_VAR);
        }
        if secret_key.is_none() {
            missing.push(SECRET_KEY_VAR);
        }
        if bucket.is_none() {
            missing.push(BUCKET_VAR);
        }
        let (Some(access_key), Some(secret_key), Some(bucket)) = (access_key, secret_key, bucket)
        else {
            return Err(EnvError::Missing(missing));
        };
        Ok(Self {
            access_key_id: access_key.to_string(),
            secret_access_key: secret_key.to_string(),
            region: layer.get(REGION_VAR).unwrap_or(DEFAULT_REGION).to_string(),
            bucket_name: bucket.to_string(),
        })
    }
}
