// crates/upload-kit-storage/src/lib.rs
// ============================================================================
// Module: Upload Kit Storage Library
// Description: Object-storage operations used by the Upload Kit tools.
// Purpose: Provision buckets and prove credentials/bucket access end to end.
// Dependencies: aws-config, aws-sdk-s3, aws-sdk-sts, async-trait, uuid
// ============================================================================

//! ## Overview
//! All storage calls go through the [`ObjectStorage`] trait. [`S3Storage`]
//! talks to S3 and STS; [`InMemoryStorage`] is a deterministic in-process
//! backend with failure injection. On top of the seam sit three workflows:
//! - [`BucketProvisioner`]: create a uniquely named bucket and harden it.
//! - [`AccessProbe`]: write, read back, presign, and delete a probe object.
//! - [`ConnectionCheck`]: identity, bucket reachability, then the probe.
//!
//! Workflows return reports rather than printing; rendering belongs to the CLI.
//! Security posture: credentials are never logged and object reads are
//! size-bounded.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod connection;
pub mod error;
pub mod memory;
pub mod naming;
pub mod probe;
pub mod provision;
pub mod s3;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::BucketSetting;
pub use client::CallerIdentity;
pub use client::EncryptionAlgorithm;
pub use client::LifecyclePolicy;
pub use client::ObjectStorage;
pub use client::StepStatus;
pub use client::StorageOperation;
pub use connection::ConnectionCheck;
pub use connection::ConnectionReport;
pub use connection::ConnectionStep;
pub use connection::ConnectionStepKind;
pub use error::ErrorFacts;
pub use error::StorageError;
pub use memory::InMemoryStorage;
pub use naming::BucketNamer;
pub use naming::validate_bucket_name;
pub use probe::AccessProbe;
pub use probe::ProbeReport;
pub use probe::ProbeStep;
pub use probe::ProbeStepKind;
pub use provision::BucketProvisioner;
pub use provision::ProvisionError;
pub use provision::ProvisionReport;
pub use provision::SettingOutcome;
pub use s3::S3Storage;
pub use s3::StaticCredentials;
pub use s3::StorageSettings;
