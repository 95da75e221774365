// S3-compatible object store origin

use super::{OriginError, OriginFetchResult, OriginKind, OriginSource};
use crate::config::ObjectStoreConfig;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client as S3Client;

/// Fetches objects by key from a single bucket
#[derive(Clone)]
pub struct ObjectStoreOrigin {
    client: S3Client,
    bucket: String,
}

impl std::fmt::Debug for ObjectStoreOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreOrigin")
            .field("bucket", &self.bucket)
            .finish()
    }
}

impl ObjectStoreOrigin {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build an S3 client from configuration
    ///
    /// Static credentials are used when both keys are configured, otherwise
    /// the default AWS credential chain applies.
    pub async fn from_config(config: &ObjectStoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
            loader = loader.credentials_provider(aws_credential_types::Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "kitsune-config",
            ));
        }

        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            "Object store client configured"
        );

        Self::new(S3Client::from_conf(builder.build()), config.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl OriginSource for ObjectStoreOrigin {
    async fn get(&self, key: &str) -> Result<OriginFetchResult, OriginError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| OriginError::ObjectStore {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| OriginError::ObjectStore {
                key: key.to_string(),
                message: format!("failed to read body: {}", e),
            })?
            .into_bytes();

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size = bytes.len(),
            "Fetched source from object store"
        );

        Ok(OriginFetchResult {
            bytes,
            origin: OriginKind::ObjectStore,
        })
    }
}
