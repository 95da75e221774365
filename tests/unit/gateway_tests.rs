// Gateway routing tests against the public handler

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use kitsune::cache::{MemoryCacheConfig, MemoryCacheStore};
use kitsune::gateway::{route_label, KitsuneGateway};
use kitsune::image_optimizer::RasterProcessor;
use kitsune::metrics::Metrics;
use kitsune::origin::{
    HostResolver, OriginError, OriginFetchResult, OriginKind, OriginSource, RemoteHttpOrigin,
};
use kitsune::pipeline::{CacheStatus, TransformationOrchestrator};
use kitsune::security::{AddressPolicy, SignatureVerifier};
use rstest::rstest;
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

const SECRET: &str = "gateway-test-secret";

struct SinglePhoto(Bytes);

#[async_trait]
impl OriginSource for SinglePhoto {
    async fn get(&self, key: &str) -> Result<OriginFetchResult, OriginError> {
        if key == "photo.png" {
            Ok(OriginFetchResult {
                bytes: self.0.clone(),
                origin: OriginKind::ObjectStore,
            })
        } else {
            Err(OriginError::ObjectStore {
                key: key.to_string(),
                message: "NoSuchKey".to_string(),
            })
        }
    }
}

fn photo() -> Bytes {
    let img = RgbaImage::from_pixel(64, 48, Rgba([200, 40, 40, 255]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png).unwrap();
    Bytes::from(buffer.into_inner())
}

/// Answers every lookup with one internal address
struct InternalResolver;

#[async_trait]
impl HostResolver for InternalResolver {
    async fn resolve(&self, _host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>> {
        Ok(vec![SocketAddr::from(([10, 20, 30, 40], port))])
    }
}

fn gateway(signed: bool) -> (KitsuneGateway, Arc<Metrics>) {
    let remote = RemoteHttpOrigin::new(
        AddressPolicy::default(),
        1024 * 1024,
        Duration::from_secs(2),
    );
    gateway_with_remote(signed, remote)
}

fn gateway_with_remote(signed: bool, remote: RemoteHttpOrigin) -> (KitsuneGateway, Arc<Metrics>) {
    let metrics = Arc::new(Metrics::new().unwrap());
    let orchestrator = TransformationOrchestrator::new(
        Arc::new(MemoryCacheStore::new(
            &MemoryCacheConfig::default(),
            Duration::from_secs(60),
        )),
        Arc::new(SinglePhoto(photo())),
        Arc::new(remote),
        Arc::new(RasterProcessor::default()),
        metrics.clone(),
    );
    let verifier = signed.then(|| SignatureVerifier::new(SECRET));
    let gateway = KitsuneGateway::new(orchestrator, verifier, metrics.clone(), Duration::from_secs(10));
    (gateway, metrics)
}

fn signed(query: &str) -> String {
    format!("{}&s={}", query, kitsune::security::signature::sign(query, SECRET))
}

#[tokio::test]
async fn test_transform_returns_image() {
    let (gw, _) = gateway(false);

    let response = gw
        .handle("GET", "/transform", Some("path=photo.png&width=32&format=jpeg"))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.content_type, "image/jpeg");
    assert_eq!(response.cache_status, Some(CacheStatus::Miss));
    assert!(response.body.starts_with(&[0xFF, 0xD8]));
}

#[tokio::test]
async fn test_missing_object_is_bad_gateway() {
    let (gw, _) = gateway(false);
    let response = gw
        .handle("GET", "/transform", Some("path=nope.png&width=32"))
        .await;
    assert_eq!(response.status, 502);

    let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(body["error"], "Bad Gateway");
    assert_eq!(body["status"], 502);
    assert!(!body["message"].as_str().unwrap().contains("NoSuchKey"));
}

#[tokio::test]
async fn test_forbidden_body_does_not_reveal_resolved_address() {
    let remote = RemoteHttpOrigin::new(
        AddressPolicy::default(),
        1024 * 1024,
        Duration::from_secs(2),
    )
    .with_resolver(Arc::new(InternalResolver));
    let (gw, _) = gateway_with_remote(false, remote);

    let response = gw
        .handle(
            "GET",
            "/transform",
            Some("url=http%3A%2F%2Fdb.corp.internal%2Fx.png&width=32"),
        )
        .await;

    assert_eq!(response.status, 403);
    let body = String::from_utf8(response.body.to_vec()).unwrap();
    assert!(!body.contains("10.20.30.40"));
    assert!(!body.contains("db.corp.internal"));
}

#[rstest]
#[case("path=photo.png&width=60000&height=60000")]
#[case("path=photo.png&width=4294967295")]
#[case("path=photo.png&height=4097")]
#[tokio::test]
async fn test_oversized_output_is_bad_request(#[case] query: &str) {
    let (gw, metrics) = gateway(false);

    let response = gw.handle("GET", "/transform", Some(query)).await;

    assert_eq!(response.status, 400);
    // Rejected before the pipeline runs
    assert_eq!(metrics.cache_misses(), 0);
}

#[tokio::test]
async fn test_private_remote_url_is_forbidden() {
    let (gw, _) = gateway(false);
    let response = gw
        .handle(
            "GET",
            "/transform",
            Some("url=http%3A%2F%2F127.0.0.1%2Fsecret.png&width=32"),
        )
        .await;
    assert_eq!(response.status, 403);
}

#[tokio::test]
async fn test_metadata_endpoint_is_forbidden() {
    let (gw, _) = gateway(false);
    let response = gw
        .handle(
            "GET",
            "/transform",
            Some("url=http://169.254.169.254/latest/meta-data&width=32"),
        )
        .await;
    assert_eq!(response.status, 403);
}

#[tokio::test]
async fn test_unparsable_remote_url_is_bad_request() {
    let (gw, _) = gateway(false);
    let response = gw
        .handle("GET", "/transform", Some("url=http%3A%2F%2F&width=32"))
        .await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_signed_request_is_accepted() {
    let (gw, metrics) = gateway(true);
    let query = signed("path=photo.png&width=16&height=16&crop=smart");

    let response = gw.handle("GET", "/transform", Some(&query)).await;

    assert_eq!(response.status, 200);
    assert_eq!(metrics.signature_rejections("invalid"), 0);
}

#[tokio::test]
async fn test_tampered_request_is_rejected() {
    let (gw, metrics) = gateway(true);
    let query = signed("path=photo.png&width=16").replace("width=16", "width=17");

    let response = gw.handle("GET", "/transform", Some(&query)).await;

    assert_eq!(response.status, 403);
    assert_eq!(metrics.signature_rejections("invalid"), 1);
}

#[tokio::test]
async fn test_health_and_metrics_skip_signature() {
    let (gw, _) = gateway(true);

    assert_eq!(gw.handle("GET", "/health", None).await.status, 200);

    gw.handle("GET", "/transform", Some("path=photo.png&width=8"))
        .await;
    let metrics = gw.handle("GET", "/metrics", None).await;
    assert_eq!(metrics.status, 200);
    let body = String::from_utf8(metrics.body.to_vec()).unwrap();
    assert!(body.contains("kitsune_signature_rejections_total{reason=\"missing\"} 1"));
}

#[test]
fn test_route_label_for_metrics() {
    assert_eq!(route_label("/transform"), "/transform");
    assert_eq!(route_label("/admin"), "other");
}
