//! HTTP API over a shared [`SketchLens`] context.
//!
//! The context is built once at startup and handed to every handler as
//! `Arc` state. Generated images are served from the cache directory under
//! the configured static prefix.

mod error;
mod routes;

pub use routes::PredictResponse;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    routing::{get, post},
    Router,
};
use sketchlens_core::SketchLens;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Build the API router.
pub fn router(lens: Arc<SketchLens>) -> Router {
    let config = lens.config();
    let body_limit = (config.limits.max_payload_mb as usize).saturating_mul(1024 * 1024);
    let static_prefix = lens.orchestrator().cache().url_prefix().to_string();
    let static_files = ServeDir::new(lens.orchestrator().cache().dir())
        .not_found_service(routes::image_not_found.into_service());

    Router::new()
        .route("/", get(routes::index))
        .route("/api/health", get(routes::health))
        .route("/api/categories", get(routes::categories))
        .route("/api/predict", post(routes::predict))
        .route("/api/generate-image", post(routes::generate_image))
        .with_state(lens)
        .nest_service(&static_prefix, static_files)
        .fallback(routes::route_not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(lens: Arc<SketchLens>, addr: &str) -> anyhow::Result<()> {
    let app = router(lens);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use base64::Engine;
    use serde_json::{json, Value};
    use sketchlens_core::classifier::{CategorySet, Classifier, ModelArtifact, PixelTensor};
    use sketchlens_core::generation::{
        GenerationOrchestrator, ImageCache, ImageProvider, ImageReference,
    };
    use sketchlens_core::{Config, ModelError, ProviderError};
    use std::io::Cursor;
    use std::path::Path;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FixedClassifier(Vec<f32>);

    impl Classifier for FixedClassifier {
        fn classify(&self, _tensor: &PixelTensor) -> Result<Vec<f32>, ModelError> {
            Ok(self.0.clone())
        }
    }

    struct MockProvider {
        name: &'static str,
        result: Result<ImageReference, ProviderError>,
    }

    #[async_trait]
    impl ImageProvider for MockProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(&self, _prompt: &str) -> Result<ImageReference, ProviderError> {
            self.result.clone()
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn failing(name: &'static str) -> Arc<dyn ImageProvider> {
        Arc::new(MockProvider {
            name,
            result: Err(ProviderError::Http {
                status: 503,
                message: format!("{name} down"),
            }),
        })
    }

    fn hosted(name: &'static str, url: &str) -> Arc<dyn ImageProvider> {
        Arc::new(MockProvider {
            name,
            result: Ok(ImageReference::Url(url.to_string())),
        })
    }

    fn app(providers: Vec<Arc<dyn ImageProvider>>, cache_dir: &Path) -> Router {
        app_with_config(providers, cache_dir, Config::default())
    }

    fn app_with_config(
        providers: Vec<Arc<dyn ImageProvider>>,
        cache_dir: &Path,
        config: Config,
    ) -> Router {
        let categories = CategorySet::new(
            ["cat", "sun", "tree"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        let artifact = ModelArtifact {
            classifier: Arc::new(FixedClassifier(vec![0.7, 0.2, 0.1])),
            categories,
            accuracy: 0.9134,
        };
        let orchestrator =
            GenerationOrchestrator::new(providers, ImageCache::new(cache_dir, "/static"));
        let lens = SketchLens::from_parts(config, artifact, orchestrator);
        router(Arc::new(lens))
    }

    fn blank_canvas() -> String {
        let img = image::GrayImage::from_pixel(28, 28, image::Luma([255u8]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(buf.into_inner());
        format!("data:image/png;base64,{encoded}")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_predict_blank_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(vec![], dir.path()),
            post_json(
                "/api/predict",
                json!({ "canvas_data": blank_canvas(), "description": "my doodle" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["prediction"], "cat");
        assert_eq!(body["confidence"], "70.0%");
        let confidence = body["confidence_value"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));
        assert_eq!(body["all_predictions"]["sun"], "20.0%");
        assert_eq!(body["description"], "my doodle");
        assert_eq!(body["categories"], json!(["cat", "sun", "tree"]));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_predict_distribution_keeps_category_order() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(vec![], dir.path())
            .oneshot(post_json(
                "/api/predict",
                json!({ "canvas_data": blank_canvas() }),
            ))
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let values = &text[text.find("\"all_predictions_values\"").unwrap()..];
        let cat = values.find("\"cat\"").unwrap();
        let sun = values.find("\"sun\"").unwrap();
        let tree = values.find("\"tree\"").unwrap();
        assert!(cat < sun && sun < tree);
    }

    #[tokio::test]
    async fn test_predict_missing_body() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/predict")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(vec![], dir.path()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "error": "No data provided" }));
    }

    #[tokio::test]
    async fn test_predict_oversized_body_is_json_413() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.limits.max_payload_mb = 1;
        let canvas = "A".repeat(2 * 1024 * 1024);

        let (status, body) = send(
            app_with_config(vec![], dir.path(), config),
            post_json("/api/predict", json!({ "canvas_data": canvas })),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({ "success": false, "error": "Payload too large" }));
    }

    #[tokio::test]
    async fn test_generate_image_oversized_body_is_json_413() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.limits.max_payload_mb = 1;
        let padding = "x".repeat(2 * 1024 * 1024);

        let (status, body) = send(
            app_with_config(vec![], dir.path(), config),
            post_json(
                "/api/generate-image",
                json!({ "prediction": "cat", "padding": padding }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Payload too large");
    }

    #[tokio::test]
    async fn test_predict_missing_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(vec![], dir.path()),
            post_json("/api/predict", json!({ "description": "no drawing" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No canvas data provided");
    }

    #[tokio::test]
    async fn test_predict_invalid_image() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = base64::engine::general_purpose::STANDARD.encode(b"definitely not a png");
        let (status, body) = send(
            app(vec![], dir.path()),
            post_json("/api/predict", json!({ "canvas_data": garbage })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid image data: "));
    }

    #[tokio::test]
    async fn test_generate_image_all_providers_fail() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(vec![failing("huggingface"), failing("pollinations")], dir.path()),
            post_json(
                "/api/generate-image",
                json!({ "prediction": "cat", "style": "cartoon" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Image generation failed");
        assert!(body["details"].as_str().unwrap().contains("pollinations"));
        assert!(body.get("image_url").is_none());
    }

    #[tokio::test]
    async fn test_generate_image_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(
                vec![
                    failing("huggingface"),
                    hosted("pollinations", "https://image.example.com/cat.png"),
                ],
                dir.path(),
            ),
            post_json(
                "/api/generate-image",
                json!({ "prediction": "cat", "style": "watercolor" }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["method"], "pollinations");
        assert_eq!(body["image_url"], "https://image.example.com/cat.png");
        assert_eq!(body["style"], "watercolor");
        assert!(body["prompt"]
            .as_str()
            .unwrap()
            .starts_with("a highly detailed, photorealistic cat"));
    }

    #[tokio::test]
    async fn test_generate_image_echoes_trimmed_label() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(
                vec![hosted("pollinations", "https://image.example.com/sun.png")],
                dir.path(),
            ),
            post_json(
                "/api/generate-image",
                json!({ "prediction": "  sun \n", "style": "sketch" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prediction"], "sun");
        assert!(body["prompt"].as_str().unwrap().contains("of a sun,"));
    }

    #[tokio::test]
    async fn test_generate_image_missing_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            app(vec![failing("huggingface")], dir.path()),
            post_json("/api/generate-image", json!({ "style": "cartoon" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No prediction provided");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(vec![], dir.path()), get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Server is running");
        assert_eq!(body["num_categories"], 3);
        assert_eq!(body["test_accuracy"], "91.34%");
    }

    #[tokio::test]
    async fn test_categories() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(vec![], dir.path()), get_request("/api/categories")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "categories": ["cat", "sun", "tree"], "count": 3 }));
    }

    #[tokio::test]
    async fn test_index() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(vec![], dir.path()), get_request("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "online");
        assert!(body["endpoints"]["/api/predict"].is_string());
    }

    #[tokio::test]
    async fn test_static_serves_cached_image() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("generated_1_deadbeef.png"), b"png bytes").unwrap();

        let response = app(vec![], dir.path())
            .oneshot(get_request("/static/generated_1_deadbeef.png"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"png bytes");
    }

    #[tokio::test]
    async fn test_static_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(app(vec![], dir.path()), get_request("/static/nope.png")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Image not found");
    }
}
