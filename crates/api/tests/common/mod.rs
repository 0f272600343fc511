//! Shared helpers for API integration tests.
//!
//! Mirrors the production router construction (`router::build_app_router`)
//! so tests exercise the same middleware stack, with a stub detector in
//! place of the ONNX session so no model artifact is needed.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{Rgb, RgbImage};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use agrivision_api::config::{ModelConfig, ServerConfig};
use agrivision_api::live::LiveSessions;
use agrivision_api::router::build_app_router;
use agrivision_api::state::AppState;
use agrivision_core::detection::{BoundingBox, Detection};
use agrivision_detector::{DetectionOutput, DetectorError, ObjectDetector};

/// Stub engine: reports one detection per configured (label, confidence)
/// pair, honoring the threshold, and echoes the input as "annotated".
pub struct MockDetector {
    pub results: Vec<(String, f32)>,
}

impl Default for MockDetector {
    fn default() -> Self {
        Self {
            results: vec![
                ("ripe".to_string(), 0.9),
                ("ripe".to_string(), 0.8),
                ("unripe".to_string(), 0.7),
            ],
        }
    }
}

impl ObjectDetector for MockDetector {
    fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<DetectionOutput, DetectorError> {
        let bbox = BoundingBox {
            x: 10.0,
            y: 10.0,
            width: 8.0,
            height: 8.0,
        };
        let detections = self
            .results
            .iter()
            .enumerate()
            .filter(|(_, (_, conf))| *conf >= confidence_threshold)
            .map(|(i, (label, conf))| Detection {
                label: label.clone(),
                class_id: i,
                confidence: *conf,
                bbox,
                corners: bbox.to_corners(),
                detection_id: Uuid::new_v4(),
            })
            .collect();
        Ok(DetectionOutput {
            detections,
            annotated: image.clone(),
        })
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_ttl_hours: 24,
        model: ModelConfig {
            path: "unused-in-tests.onnx".to_string(),
            input_size: 640,
            labels: vec![
                "ripe".to_string(),
                "unripe".to_string(),
                "diseased".to_string(),
            ],
        },
        narrator: None,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and the default stub detector.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        detector: Arc::new(MockDetector::default()),
        narrator: None,
        live: Arc::new(LiveSessions::new()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn patch_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PATCH")
        .uri(path)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

const MULTIPART_BOUNDARY: &str = "agrivision-test-boundary";

/// POST a single-file multipart upload under the `file` field name.
pub async fn post_multipart_auth(
    app: Router,
    path: &str,
    token: &str,
    file_name: &str,
    bytes: &[u8],
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

/// Register and log in a user through the API, returning the session token.
pub async fn register_and_login(app: &Router, username: &str) -> String {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": "orchard-pass-1",
        "confirm_password": "orchard-pass-1",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = serde_json::json!({ "username": username, "password": "orchard-pass-1" });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["token"].as_str().expect("login must return a token").to_string()
}

/// A small valid PNG for upload tests.
pub fn sample_png() -> Vec<u8> {
    let img = RgbImage::from_pixel(32, 32, Rgb([40, 120, 40]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}
