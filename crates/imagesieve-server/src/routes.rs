//! HTTP routes and handlers

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use imagesieve_core::{ClassProbabilities, Error};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(heartbeat))
        .route("/modelinfo", get(model_info))
        .route("/inference/:model_name", post(inference))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
        .fallback(fallback)
        .with_state(state)
}

async fn heartbeat() -> Json<serde_json::Value> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    Json(json!({ "now": now }))
}

/// Model listing response
#[derive(Debug, Serialize)]
struct ModelInfoResponse {
    model_names: Vec<&'static str>,
}

async fn model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    Json(ModelInfoResponse {
        model_names: state.registry.model_identifiers(),
    })
}

/// Run one uploaded image through the named model.
///
/// The model loads lazily on its first request; later requests reuse the
/// session. Loading and inference both block, so they run off the async
/// runtime.
async fn inference(
    State(state): State<AppState>,
    Path(model_name): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<ClassProbabilities>, AppError> {
    metrics::counter!("imagesieve_requests_total").increment(1);

    let model = state.registry.get(&model_name)?;
    let payload = read_upload(&mut multipart).await?;

    let image = image::load_from_memory(&payload)
        .map_err(|e| AppError::InvalidRequest(format!("could not decode uploaded image: {e}")))?;

    debug!(model = %model_name, "dispatching inference");
    let start = Instant::now();
    let preds = tokio::task::spawn_blocking(move || {
        model.ensure_loaded()?;
        model.predict_classes(&image, true)
    })
    .await
    .map_err(|e| AppError::Internal(format!("inference task failed: {e}")))??;

    metrics::histogram!("imagesieve_inference_latency_us").record(start.elapsed().as_micros() as f64);

    Ok(Json(preds))
}

/// Pull the `file` field out of a multipart upload.
async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(format!("malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidRequest(format!("failed to read upload: {e}")));
        }
    }

    Err(AppError::InvalidRequest(
        "multipart field 'file' not found".to_string(),
    ))
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found")
}

/// Error handling
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    InvalidRequest(String),
    Internal(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        match err {
            Error::UnknownModel(_) => AppError::NotFound(err.to_string()),
            Error::Preprocess(_) => AppError::InvalidRequest(err.to_string()),
            Error::Load(_) | Error::Inference(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                error!("request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        metrics::counter!("imagesieve_errors_total").increment(1);

        let body = json!({
            "error": {
                "message": message,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::io::Cursor;
    use tower::ServiceExt;

    fn test_router() -> Router {
        let config = ServerConfig {
            model_dir: "/nonexistent".into(),
            ..Default::default()
        };
        let handle = PrometheusBuilder::new().build_recorder().handle();
        create_router(AppState::new(config, handle))
    }

    fn multipart_request(uri: &str, field_name: &str, payload: &[u8]) -> Request<Body> {
        let boundary = "imagesieve-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"upload.bin\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn png_payload() -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(8, 8))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_heartbeat_reports_time() {
        let response = test_router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(json["now"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_model_info_lists_all_models() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/modelinfo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(
            json["model_names"],
            json!(["adult_nsfw", "screenshot", "bad_crop"])
        );
    }

    #[tokio::test]
    async fn test_unknown_model_is_not_found() {
        let response = test_router()
            .oneshot(multipart_request("/inference/no_such_model", "file", b"x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("no_such_model"));
    }

    #[tokio::test]
    async fn test_undecodable_upload_is_a_client_error() {
        let response = test_router()
            .oneshot(multipart_request(
                "/inference/screenshot",
                "file",
                b"definitely not an image",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_a_client_error() {
        let response = test_router()
            .oneshot(multipart_request(
                "/inference/screenshot",
                "attachment",
                &png_payload(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_weights_surface_as_server_error() {
        // Valid image, registered model, but no weights file on disk: the
        // lazy load fails and maps to a 500 for this model only.
        let response = test_router()
            .oneshot(multipart_request(
                "/inference/screenshot",
                "file",
                &png_payload(),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unrouted_path_falls_back() {
        let response = test_router()
            .oneshot(
                Request::builder()
                    .uri("/items/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
