//! Route table and middleware for the inference service.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::endpoints;
use crate::state::AppState;

/// Build the service router.
///
/// Routes:
/// - `POST /predict` multipart upload, field `file`
/// - `GET /health`
/// - `GET /diseases`, `GET /diseases/:name`
///
/// NOTE: Path params use `:param` syntax (axum 0.7).
pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/predict", post(endpoints::predict::predict))
        .route("/health", get(endpoints::health::check))
        .route("/diseases", get(endpoints::diseases::list))
        .route("/diseases/:name", get(endpoints::diseases::detail))
        .with_state(state)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ocular_ai::{ClassifierAdapter, Diagnoser, FixedScores, NormalizedTensor, ScoringModel};
    use ocular_core::ServiceConfig;
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "ocular-test-boundary";

    struct BrokenModel;

    impl ScoringModel for BrokenModel {
        fn name(&self) -> &str {
            "broken"
        }

        fn predict(&self, _input: &NormalizedTensor) -> anyhow::Result<Vec<f32>> {
            anyhow::bail!("inference session crashed")
        }
    }

    fn app_with(adapter: ClassifierAdapter, config: ServiceConfig) -> Router {
        let diagnoser = Diagnoser::new(adapter, &config);
        router(AppState::new(diagnoser, config))
    }

    fn app(scores: [f32; 4]) -> Router {
        app_with(
            ClassifierAdapter::new(FixedScores::new(scores)),
            ServiceConfig::default(),
        )
    }

    fn fundus_jpeg() -> Vec<u8> {
        let img = RgbImage::from_fn(224, 224, |x, y| Rgb([180, (x % 200) as u8, (y % 120) as u8]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .unwrap();
        buf.into_inner()
    }

    fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn predict_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn approx(value: &serde_json::Value, expected: f64) -> bool {
        value
            .as_f64()
            .is_some_and(|v| (v - expected).abs() < 1e-6)
    }

    #[tokio::test]
    async fn confident_jpeg_returns_diagnosis() {
        let req = predict_request(multipart_body("file", "scan.jpg", &fundus_jpeg()));
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["class"], "Cataract");
        assert!(approx(&json["confidence"], 0.9));
        assert_eq!(json["message"], "Analysis successful.");
        assert!(approx(&json["scores"]["Cataract"], 0.9));
        assert!(approx(&json["scores"]["Diabetic Retinopathy"], 0.03));
        assert!(approx(&json["scores"]["Glaucoma"], 0.03));
        assert!(approx(&json["scores"]["Normal"], 0.04));
    }

    #[tokio::test]
    async fn text_file_named_jpg_is_rejected() {
        let req = predict_request(multipart_body("file", "notes.jpg", b"hello, I am plain text"));
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid image format")
        );
    }

    #[tokio::test]
    async fn low_confidence_returns_sentinel() {
        let req = predict_request(multipart_body("file", "scan.jpg", &fundus_jpeg()));
        let (status, json) = send(app([0.3, 0.3, 0.2, 0.2]), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["class"], "Unknown / Invalid Image");
        assert!(approx(&json["confidence"], 0.3));
        assert_eq!(json["scores"].as_object().unwrap().len(), 4);
        assert_eq!(
            json["message"],
            "Low confidence. This may not be a retinal scan."
        );
    }

    #[tokio::test]
    async fn missing_file_field_is_rejected() {
        let req = predict_request(multipart_body("image", "scan.jpg", &fundus_jpeg()));
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({"error": "No file uploaded"}));
    }

    #[tokio::test]
    async fn non_multipart_request_has_no_file() {
        let req = Request::builder()
            .method("POST")
            .uri("/predict")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn unavailable_model_returns_500_before_decoding() {
        let app = app_with(ClassifierAdapter::unavailable(), ServiceConfig::default());
        // Undecodable payload: a 400 here would mean the upload was inspected.
        let req = predict_request(multipart_body("file", "notes.jpg", b"not an image"));
        let (status, json) = send(app, req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({"error": "Model not loaded"}));
    }

    #[tokio::test]
    async fn unavailable_model_ignores_missing_file() {
        let app = app_with(ClassifierAdapter::unavailable(), ServiceConfig::default());
        let req = Request::builder()
            .method("POST")
            .uri("/predict")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Model not loaded");
    }

    #[tokio::test]
    async fn scoring_failure_returns_message() {
        let app = app_with(ClassifierAdapter::new(BrokenModel), ServiceConfig::default());
        let req = predict_request(multipart_body("file", "scan.jpg", &fundus_jpeg()));
        let (status, json) = send(app, req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({"error": "inference session crashed"}));
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let config = ServiceConfig::default().with_max_upload_bytes(1024);
        let app = app_with(
            ClassifierAdapter::new(FixedScores::new([0.9, 0.03, 0.03, 0.04])),
            config,
        );
        let req = predict_request(multipart_body("file", "scan.jpg", &vec![0u8; 64 * 1024]));
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn health_reports_model_state() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model_loaded"], true);
        assert_eq!(json["model"], "fixed-scores");
        assert!(approx(&json["threshold"], 0.75));
        assert_eq!(
            json["labels"],
            serde_json::json!(["Cataract", "Diabetic Retinopathy", "Glaucoma", "Normal"])
        );

        let app = app_with(ClassifierAdapter::unavailable(), ServiceConfig::default());
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (_, json) = send(app, req).await;
        assert_eq!(json["model_loaded"], false);
        assert!(json["model"].is_null());
    }

    #[tokio::test]
    async fn diseases_list_and_detail() {
        let req = Request::builder().uri("/diseases").body(Body::empty()).unwrap();
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            ["Cataract", "Diabetic Retinopathy", "Glaucoma", "Normal"]
        );

        let req = Request::builder()
            .uri("/diseases/diabetic-retinopathy")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tag"], "Retinal Vessel Damage");
    }

    #[tokio::test]
    async fn unknown_disease_is_404() {
        let req = Request::builder()
            .uri("/diseases/retinitis")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app([0.9, 0.03, 0.03, 0.04]), req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Unknown disease: retinitis");
    }
}
