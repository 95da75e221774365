// Transform pipeline tests with the real image processor and memory cache

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use kitsune::cache::{CacheStore, MemoryCacheConfig, MemoryCacheStore};
use kitsune::image_optimizer::{ImageProcessor, OutputFormat, RasterProcessor};
use kitsune::metrics::Metrics;
use kitsune::origin::{OriginError, OriginFetchResult, OriginKind, OriginSource, SourceIdentifier};
use kitsune::pipeline::{
    CacheStatus, PipelineError, RequestContext, TransformationOptions, TransformationOrchestrator,
    WatermarkOptions,
};
use kitsune::watermark::Gravity;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn png(width: u32, height: u32, color: [u8; 4]) -> Bytes {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    Bytes::from(buffer.into_inner())
}

/// In-memory bucket counting its fetches
struct Bucket {
    objects: HashMap<String, Bytes>,
    fetches: AtomicUsize,
}

impl Bucket {
    fn new(objects: Vec<(&str, Bytes)>) -> Self {
        Self {
            objects: objects
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OriginSource for Bucket {
    async fn get(&self, key: &str) -> Result<OriginFetchResult, OriginError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.objects
            .get(key)
            .map(|bytes| OriginFetchResult {
                bytes: bytes.clone(),
                origin: OriginKind::ObjectStore,
            })
            .ok_or_else(|| OriginError::ObjectStore {
                key: key.to_string(),
                message: "NoSuchKey".to_string(),
            })
    }
}

struct Unreachable;

#[async_trait]
impl OriginSource for Unreachable {
    async fn get(&self, _url: &str) -> Result<OriginFetchResult, OriginError> {
        Err(OriginError::Transport("connection refused".to_string()))
    }
}

struct Setup {
    bucket: Arc<Bucket>,
    cache: Arc<MemoryCacheStore>,
    metrics: Arc<Metrics>,
    orchestrator: TransformationOrchestrator,
}

fn setup() -> Setup {
    let bucket = Arc::new(Bucket::new(vec![
        ("photos/landscape.png", png(400, 200, [30, 120, 200, 255])),
        ("marks/logo.png", png(40, 20, [255, 255, 255, 255])),
        ("photos/broken.png", Bytes::from_static(b"definitely not a png")),
    ]));
    let cache = Arc::new(MemoryCacheStore::new(
        &MemoryCacheConfig::default(),
        Duration::from_secs(60),
    ));
    let metrics = Arc::new(Metrics::new().unwrap());
    let orchestrator = TransformationOrchestrator::new(
        cache.clone(),
        bucket.clone(),
        Arc::new(Unreachable),
        Arc::new(RasterProcessor::default()),
        metrics.clone(),
    );

    Setup {
        bucket,
        cache,
        metrics,
        orchestrator,
    }
}

fn options(width: u32, height: u32) -> TransformationOptions {
    TransformationOptions {
        width,
        height,
        ..Default::default()
    }
}

async fn wait_for_entry(cache: &MemoryCacheStore) {
    for _ in 0..100 {
        if cache.entry_count().await > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("cache entry was never written");
}

#[tokio::test]
async fn test_transform_produces_requested_size_and_format() {
    let s = setup();
    let source = SourceIdentifier::parse("photos/landscape.png");
    let opts = TransformationOptions {
        format: OutputFormat::WebP,
        ..options(100, 0)
    };

    let image = s.orchestrator.process(&opts, &source).await.unwrap();

    assert_eq!(image.content_type, "image/webp");
    assert_eq!(image.cache_status, CacheStatus::Miss);
    let dims = RasterProcessor::default().dimensions(&image.data).unwrap();
    assert_eq!((dims.width, dims.height), (100, 50));
}

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let s = setup();
    let source = SourceIdentifier::parse("photos/landscape.png");
    let opts = options(80, 80);

    let first = s.orchestrator.process(&opts, &source).await.unwrap();
    wait_for_entry(&s.cache).await;
    let second = s.orchestrator.process(&opts, &source).await.unwrap();

    assert_eq!(first.cache_status, CacheStatus::Miss);
    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(first.data, second.data);
    assert_eq!(s.bucket.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(s.metrics.cache_hits(), 1);
    assert_eq!(s.metrics.cache_misses(), 1);

    let cached = s.cache.get(&opts.fingerprint(&source)).await.unwrap();
    assert_eq!(cached, Some(first.data));
}

#[tokio::test]
async fn test_watermarked_image_keeps_transformed_size() {
    let s = setup();
    let source = SourceIdentifier::parse("photos/landscape.png");
    let opts = TransformationOptions {
        watermark: Some(WatermarkOptions::new("marks/logo.png", 0.7, Gravity::South)),
        ..options(200, 100)
    };

    let image = s.orchestrator.process(&opts, &source).await.unwrap();

    let dims = RasterProcessor::default().dimensions(&image.data).unwrap();
    assert_eq!((dims.width, dims.height), (200, 100));
    assert_eq!(s.bucket.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_watermark_fails_the_request() {
    let s = setup();
    let source = SourceIdentifier::parse("photos/landscape.png");
    let opts = TransformationOptions {
        watermark: Some(WatermarkOptions::with_defaults("marks/missing.png")),
        ..options(200, 100)
    };

    let err = s.orchestrator.process(&opts, &source).await.unwrap_err();

    assert!(matches!(err, PipelineError::WatermarkUnavailable(_)));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(s.cache.entry_count().await, 0);
}

#[tokio::test]
async fn test_undecodable_source_is_processing_error() {
    let s = setup();
    let source = SourceIdentifier::parse("photos/broken.png");

    let err = s.orchestrator.process(&options(10, 10), &source).await.unwrap_err();
    assert!(matches!(err, PipelineError::Processing(_)));
}

#[tokio::test]
async fn test_remote_identifier_never_touches_bucket() {
    let s = setup();
    let source = SourceIdentifier::parse("https://cdn.example.com/photo.jpg");

    let err = s.orchestrator.process(&options(10, 10), &source).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::OriginUnavailable(OriginError::Transport(_))
    ));
    assert_eq!(s.bucket.fetches.load(Ordering::SeqCst), 0);
}

#[test]
fn test_request_context_tracks_route() {
    let mut ctx = RequestContext::new();
    ctx.set_request("GET", "/metrics");

    assert_eq!(ctx.method(), "GET");
    assert_eq!(ctx.route(), "/metrics");
    assert_eq!(ctx.request_id().len(), 36);
}
