// Transformation orchestrator
//
// Cache lookup -> origin fetch -> transform -> optional watermark -> async cache write.
// Cache faults degrade to a miss; every other failure is terminal.

use bytes::Bytes;
use std::sync::Arc;

use super::error::PipelineError;
use super::options::{TransformationOptions, WatermarkOptions};
use crate::cache::{CacheFingerprint, CacheStore};
use crate::image_optimizer::{CompositeParams, ImageError, ImageProcessor};
use crate::metrics::Metrics;
use crate::origin::{OriginSource, SourceIdentifier};
use crate::watermark::calculate_position;

/// Whether the response came from cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    /// Value of the `X-Cache` response header
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

/// Result of a successful transform request
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub data: Bytes,
    pub content_type: &'static str,
    pub cache_status: CacheStatus,
}

/// Runs one transform request against the shared components
#[derive(Clone)]
pub struct TransformationOrchestrator {
    cache: Arc<dyn CacheStore>,
    object_store: Arc<dyn OriginSource>,
    remote: Arc<dyn OriginSource>,
    processor: Arc<dyn ImageProcessor>,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for TransformationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationOrchestrator")
            .field("cache", &self.cache.backend_name())
            .finish_non_exhaustive()
    }
}

impl TransformationOrchestrator {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        object_store: Arc<dyn OriginSource>,
        remote: Arc<dyn OriginSource>,
        processor: Arc<dyn ImageProcessor>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            cache,
            object_store,
            remote,
            processor,
            metrics,
        }
    }

    /// Produce the transformed image for a request
    pub async fn process(
        &self,
        options: &TransformationOptions,
        source: &SourceIdentifier,
    ) -> Result<ProcessedImage, PipelineError> {
        let fingerprint = options.fingerprint(source);
        let content_type = options.format.content_type();

        if let Some(data) = self.lookup(&fingerprint).await {
            self.metrics.increment_cache_hit();
            tracing::debug!(fingerprint = %fingerprint, "Cache hit");
            return Ok(ProcessedImage {
                data,
                content_type,
                cache_status: CacheStatus::Hit,
            });
        }

        self.metrics.increment_cache_miss();
        tracing::debug!(fingerprint = %fingerprint, "Cache miss");

        let origin = match source {
            SourceIdentifier::ObjectStore(_) => &self.object_store,
            SourceIdentifier::Remote(_) => &self.remote,
        };
        let fetched = origin.get(source.as_str()).await.map_err(|e| {
            tracing::warn!(
                source = %source,
                origin = source.kind().as_str(),
                error_kind = e.kind(),
                error = %e,
                "Origin fetch failed"
            );
            PipelineError::OriginUnavailable(e)
        })?;

        let mut output = self.transform(fetched.bytes, options).await?;

        if let Some(watermark) = &options.watermark {
            output = self.apply_watermark(output, watermark, options).await?;
        }

        let data = Bytes::from(output);
        self.spawn_cache_write(fingerprint, data.clone());

        Ok(ProcessedImage {
            data,
            content_type,
            cache_status: CacheStatus::Miss,
        })
    }

    /// Cache read; any backend error is treated as a miss
    async fn lookup(&self, fingerprint: &CacheFingerprint) -> Option<Bytes> {
        match self.cache.get(fingerprint).await {
            Ok(found) => found,
            Err(e) => {
                self.metrics.increment_cache_error("get");
                tracing::error!(
                    fingerprint = %fingerprint,
                    backend = self.cache.backend_name(),
                    error = %e,
                    "Cache read failed, continuing as miss"
                );
                None
            }
        }
    }

    async fn transform(
        &self,
        source: Bytes,
        options: &TransformationOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let processor = Arc::clone(&self.processor);
        let params = options.transform_params();

        let result = tokio::task::spawn_blocking(move || processor.transform(&source, &params))
            .await
            .map_err(ImageError::from)?;

        result.map_err(|e| {
            tracing::warn!(error = %e, "Image transform failed");
            PipelineError::Processing(e)
        })
    }

    async fn apply_watermark(
        &self,
        base: Vec<u8>,
        watermark: &WatermarkOptions,
        options: &TransformationOptions,
    ) -> Result<Vec<u8>, PipelineError> {
        let overlay = self
            .object_store
            .get(&watermark.asset)
            .await
            .map_err(|e| {
                tracing::warn!(asset = %watermark.asset, error = %e, "Watermark fetch failed");
                PipelineError::WatermarkUnavailable(e)
            })?
            .bytes;

        let processor = Arc::clone(&self.processor);
        let gravity = watermark.gravity;
        let opacity = watermark.opacity;
        let format = options.format;
        let quality = options.quality;

        let result = tokio::task::spawn_blocking(move || {
            let base_dims = processor.dimensions(&base)?;
            let mark_dims = processor.dimensions(&overlay)?;
            let placement = calculate_position(&base_dims, &mark_dims, gravity);

            let params = CompositeParams {
                top: placement.top,
                left: placement.left,
                opacity,
                format,
                quality,
            };
            processor.composite(&base, &overlay, &params)
        })
        .await
        .map_err(ImageError::from)?;

        result.map_err(|e| {
            tracing::warn!(asset = %watermark.asset, error = %e, "Watermark composite failed");
            PipelineError::Processing(e)
        })
    }

    /// Store the result without holding up the response
    fn spawn_cache_write(&self, fingerprint: CacheFingerprint, data: Bytes) {
        let cache = Arc::clone(&self.cache);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            if let Err(e) = cache.set(&fingerprint, data).await {
                metrics.increment_cache_error("set");
                tracing::error!(
                    fingerprint = %fingerprint,
                    backend = cache.backend_name(),
                    error = %e,
                    "Cache write failed"
                );
            }
        });
    }
}
