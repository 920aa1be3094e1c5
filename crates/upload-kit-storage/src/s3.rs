// crates/upload-kit-storage/src/s3.rs
// ============================================================================
// Module: S3 Storage Backend
// Description: `ObjectStorage` implementation backed by aws-sdk-s3 and STS.
// Purpose: Execute provisioning and probe calls against real object storage.
// Dependencies: aws-config, aws-sdk-s3, aws-sdk-sts, tokio
// ============================================================================

//! ## Overview
//! [`S3Storage`] loads a shared SDK configuration once (region, optional
//! endpoint, optional static credentials) and builds an S3 client and an STS
//! client from it. Every SDK failure is reduced to [`ErrorFacts`] and
//! classified, so callers never see SDK error types.
//! Security posture: credentials are never logged; downloads are size-bounded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::BucketLifecycleConfiguration;
use aws_sdk_s3::types::BucketLocationConstraint;
use aws_sdk_s3::types::BucketVersioningStatus;
use aws_sdk_s3::types::CreateBucketConfiguration;
use aws_sdk_s3::types::ExpirationStatus;
use aws_sdk_s3::types::LifecycleExpiration;
use aws_sdk_s3::types::LifecycleRule;
use aws_sdk_s3::types::LifecycleRuleFilter;
use aws_sdk_s3::types::NoncurrentVersionExpiration;
use aws_sdk_s3::types::PublicAccessBlockConfiguration;
use aws_sdk_s3::types::ServerSideEncryption;
use aws_sdk_s3::types::ServerSideEncryptionByDefault;
use aws_sdk_s3::types::ServerSideEncryptionConfiguration;
use aws_sdk_s3::types::ServerSideEncryptionRule;
use aws_sdk_s3::types::VersioningConfiguration;
use tokio::io::AsyncReadExt;
use upload_kit_config::EnvLayer;
use upload_kit_config::StorageConfig;
use upload_kit_config::UploadEnv;
use upload_kit_config::env::ACCESS_KEY_VAR;
use upload_kit_config::env::REGION_VAR;
use upload_kit_config::env::SECRET_KEY_VAR;

use crate::client::CallerIdentity;
use crate::client::EncryptionAlgorithm;
use crate::client::LifecyclePolicy;
use crate::client::ObjectStorage;
use crate::client::StorageOperation;
use crate::error::ErrorFacts;
use crate::error::StorageError;
use crate::error::classify;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Region in which buckets are created without a location constraint.
const US_EAST_1: &str = "us-east-1";
/// Provider name attached to static credentials.
const CREDENTIALS_PROVIDER_NAME: &str = "upload-kit-env";
/// Read buffer size for object downloads.
const READ_CHUNK_BYTES: usize = 8192;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Explicit access key pair.
#[derive(Clone)]
pub struct StaticCredentials {
    /// Access key identifier.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Inputs for building an [`S3Storage`].
#[derive(Debug, Clone, Default)]
pub struct StorageSettings {
    /// Region; `None` defers to the SDK default chain, then `us-east-1`.
    pub region: Option<String>,
    /// Custom endpoint (S3-compatible stores).
    pub endpoint: Option<String>,
    /// Force path-style addressing.
    pub force_path_style: bool,
    /// Explicit credentials; `None` uses the SDK default chain.
    pub credentials: Option<StaticCredentials>,
}

impl StorageSettings {
    /// Builds settings from the storage config section and resolved env.
    ///
    /// The config region wins over the environment region.
    #[must_use]
    pub fn from_env(config: &StorageConfig, env: &UploadEnv) -> Self {
        Self {
            region: config.region.clone().or_else(|| Some(env.region.clone())),
            endpoint: config.endpoint.clone(),
            force_path_style: config.force_path_style,
            credentials: Some(StaticCredentials {
                access_key_id: env.access_key_id.clone(),
                secret_access_key: env.secret_access_key.clone(),
            }),
        }
    }

    /// Builds settings from whatever the env layer provides.
    ///
    /// Explicit keys are installed only when both halves are set; otherwise
    /// the SDK default credential chain applies. The bucket is not required.
    #[must_use]
    pub fn from_layer(config: &StorageConfig, layer: &EnvLayer) -> Self {
        let credentials = match (layer.get(ACCESS_KEY_VAR), layer.get(SECRET_KEY_VAR)) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
            }),
            _ => None,
        };
        Self {
            region: config.region.clone().or_else(|| layer.get(REGION_VAR).map(str::to_string)),
            endpoint: config.endpoint.clone(),
            force_path_style: config.force_path_style,
            credentials,
        }
    }
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// S3/STS-backed [`ObjectStorage`].
#[derive(Debug, Clone)]
pub struct S3Storage {
    /// S3 client.
    s3: Client,
    /// STS client.
    sts: aws_sdk_sts::Client,
    /// Effective region.
    region: String,
}

impl S3Storage {
    /// Loads SDK configuration and builds the clients.
    pub async fn connect(settings: StorageSettings, fallback_region: &str) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(credentials) = &settings.credentials {
            loader = loader.credentials_provider(Credentials::new(
                credentials.access_key_id.clone(),
                credentials.secret_access_key.clone(),
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }
        let shared_config = loader.load().await;
        let region = shared_config
            .region()
            .map_or_else(|| fallback_region.to_string(), ToString::to_string);
        let mut s3_builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if settings.force_path_style {
            s3_builder = s3_builder.force_path_style(true);
        }
        if shared_config.region().is_none() {
            s3_builder = s3_builder.region(Region::new(region.clone()));
        }
        let s3 = Client::from_conf(s3_builder.build());
        let mut sts_builder = aws_sdk_sts::config::Builder::from(&shared_config);
        if shared_config.region().is_none() {
            sts_builder = sts_builder.region(Region::new(region.clone()));
        }
        let sts = aws_sdk_sts::Client::from_conf(sts_builder.build());
        tracing::debug!(
            region = %region,
            endpoint = settings.endpoint.as_deref().unwrap_or("default"),
            static_credentials = settings.credentials.is_some(),
            "s3 storage configured"
        );
        Self {
            s3,
            sts,
            region,
        }
    }
}

/// Reduces an SDK error to classification facts.
fn sdk_facts<E>(err: &SdkError<E, HttpResponse>) -> ErrorFacts
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    ErrorFacts {
        code: err.code().map(str::to_string),
        status: err.raw_response().map(|response| response.status().as_u16()),
        message: DisplayErrorContext(err).to_string(),
        service: matches!(err, SdkError::ServiceError(_)),
    }
}

/// Classifies an SDK error and logs the failed operation.
fn map_sdk_error<E>(
    operation: StorageOperation,
    bucket: &str,
    err: &SdkError<E, HttpResponse>,
) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let classified = classify(sdk_facts(err), bucket);
    tracing::debug!(operation = operation.as_str(), bucket, error = %classified, "storage call failed");
    classified
}

#[async_trait]
impl ObjectStorage for S3Storage {
    fn region(&self) -> &str {
        &self.region
    }

    async fn caller_identity(&self) -> Result<CallerIdentity, StorageError> {
        let output = self
            .sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::CallerIdentity, "", &err))?;
        Ok(CallerIdentity {
            account: output.account().unwrap_or_default().to_string(),
            arn: output.arn().unwrap_or_default().to_string(),
        })
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<(), StorageError> {
        let mut request = self.s3.create_bucket().bucket(bucket);
        if region != US_EAST_1 {
            let configuration = CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build();
            request = request.create_bucket_configuration(configuration);
        }
        request
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::CreateBucket, bucket, &err))?;
        Ok(())
    }

    async fn block_public_access(&self, bucket: &str) -> Result<(), StorageError> {
        let configuration = PublicAccessBlockConfiguration::builder()
            .block_public_acls(true)
            .ignore_public_acls(true)
            .block_public_policy(true)
            .restrict_public_buckets(true)
            .build();
        self.s3
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(configuration)
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::BlockPublicAccess, bucket, &err))?;
        Ok(())
    }

    async fn enable_versioning(&self, bucket: &str) -> Result<(), StorageError> {
        let configuration =
            VersioningConfiguration::builder().status(BucketVersioningStatus::Enabled).build();
        self.s3
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(configuration)
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::EnableVersioning, bucket, &err))?;
        Ok(())
    }

    async fn put_lifecycle(
        &self,
        bucket: &str,
        policy: &LifecyclePolicy,
    ) -> Result<(), StorageError> {
        let rule = LifecycleRule::builder()
            .id(policy.rule_id.clone())
            .status(ExpirationStatus::Enabled)
            .filter(LifecycleRuleFilter::builder().prefix(policy.prefix.clone()).build())
            .expiration(LifecycleExpiration::builder().days(policy.expiration_days).build())
            .noncurrent_version_expiration(
                NoncurrentVersionExpiration::builder()
                    .noncurrent_days(policy.noncurrent_days)
                    .build(),
            )
            .build()
            .map_err(|err| StorageError::invalid(err.to_string()))?;
        let configuration = BucketLifecycleConfiguration::builder()
            .rules(rule)
            .build()
            .map_err(|err| StorageError::invalid(err.to_string()))?;
        self.s3
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(configuration)
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::PutLifecycle, bucket, &err))?;
        Ok(())
    }

    async fn enable_default_encryption(
        &self,
        bucket: &str,
        algorithm: EncryptionAlgorithm,
    ) -> Result<(), StorageError> {
        let sse = match algorithm {
            EncryptionAlgorithm::Aes256 => ServerSideEncryption::Aes256,
            EncryptionAlgorithm::AwsKms => ServerSideEncryption::AwsKms,
        };
        let by_default = ServerSideEncryptionByDefault::builder()
            .sse_algorithm(sse)
            .build()
            .map_err(|err| StorageError::invalid(err.to_string()))?;
        let rule = ServerSideEncryptionRule::builder()
            .apply_server_side_encryption_by_default(by_default)
            .build();
        let configuration = ServerSideEncryptionConfiguration::builder()
            .rules(rule)
            .build()
            .map_err(|err| StorageError::invalid(err.to_string()))?;
        self.s3
            .put_bucket_encryption()
            .bucket(bucket)
            .server_side_encryption_configuration(configuration)
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::EnableEncryption, bucket, &err))?;
        Ok(())
    }

    async fn head_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.s3
            .head_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::HeadBucket, bucket, &err))?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let mut request =
            self.s3.put_object().bucket(bucket).key(key).body(ByteStream::from(bytes));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }
        request
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::PutObject, bucket, &err))?;
        Ok(())
    }

    async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        max_bytes: usize,
    ) -> Result<Vec<u8>, StorageError> {
        let output = self
            .s3
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::GetObject, bucket, &err))?;
        if let Some(length) = output.content_length() {
            let actual_bytes = usize::try_from(length).unwrap_or(usize::MAX);
            if actual_bytes > max_bytes {
                return Err(StorageError::TooLarge {
                    key: key.to_string(),
                    max_bytes,
                    actual_bytes,
                });
            }
        }
        let mut reader = output.body.into_async_read();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; READ_CHUNK_BYTES];
        loop {
            let read =
                reader.read(&mut chunk).await.map_err(|err| StorageError::io(err.to_string()))?;
            if read == 0 {
                break;
            }
            let total_bytes = buffer
                .len()
                .checked_add(read)
                .ok_or_else(|| StorageError::io("object size overflow"))?;
            if total_bytes > max_bytes {
                return Err(StorageError::TooLarge {
                    key: key.to_string(),
                    max_bytes,
                    actual_bytes: total_bytes,
                });
            }
            buffer.extend_from_slice(&chunk[.. read]);
        }
        Ok(buffer)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.s3
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| map_sdk_error(StorageOperation::DeleteObject, bucket, &err))?;
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in)
            .map_err(|err| StorageError::invalid(err.to_string()))?;
        let request = self
            .s3
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|err| map_sdk_error(StorageOperation::PresignGet, bucket, &err))?;
        Ok(request.uri().to_string())
    }
}
