//! HTTP handlers for the development host
//!
//! Serves the config document at its well-known location, a status
//! endpoint, and the compiled web bundle for every other path.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::{ShellSettings, CONFIG_DOCUMENT_PATH};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ShellSettings>,
    pub started: Instant,
}

impl AppState {
    pub fn new(settings: ShellSettings) -> Self {
        Self {
            settings: Arc::new(settings),
            started: Instant::now(),
        }
    }
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

/// General status response
#[derive(Serialize)]
pub struct StatusResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub git_sha: &'static str,
    pub uptime_secs: u64,
}

/// GET /status - Service health check
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "federated-shell",
        version: env!("FSH_VERSION"),
        git_sha: env!("FSH_GIT_SHA"),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

/// GET /aws-exports.json - The deployment's config document, as stored on disk
pub async fn config_document_handler(State(state): State<AppState>) -> Response {
    let path = &state.settings.document_path;
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("Config document not found at {}", path.display());
            return error_response(
                StatusCode::NOT_FOUND,
                format!("Config document not found: {}", path.display()),
            );
        }
        Err(e) => {
            tracing::error!("Failed to read config document {}: {}", path.display(), e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    // Refuse to serve something the client cannot parse
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(document) => Json(document).into_response(),
        Err(e) => {
            tracing::error!("Config document {} is not valid JSON: {}", path.display(), e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Config document is not valid JSON: {}", e),
            )
        }
    }
}

/// Build the host router
pub fn router(state: AppState) -> Router {
    let assets = state.settings.assets_dir.clone();
    let spa = ServeDir::new(&assets).fallback(ServeFile::new(assets.join("index.html")));

    Router::new()
        .route("/status", get(status_handler))
        .route(CONFIG_DOCUMENT_PATH, get(config_document_handler))
        .fallback_service(spa)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_document(path: std::path::PathBuf) -> AppState {
        AppState::new(ShellSettings {
            port: 0,
            document_path: path,
            assets_dir: std::path::PathBuf::from("."),
        })
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_serves_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aws-exports.json");
        std::fs::write(&path, r#"{"aws_project_region":"eu-west-1"}"#).unwrap();

        let resp = config_document_handler(State(state_with_document(path))).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["aws_project_region"], "eu-west-1");
    }

    #[tokio::test]
    async fn test_missing_document_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let resp =
            config_document_handler(State(state_with_document(dir.path().join("none.json"))))
                .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_document_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aws-exports.json");
        std::fs::write(&path, "{ not json").unwrap();

        let resp = config_document_handler(State(state_with_document(path))).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(resp).await["error"]
            .as_str()
            .unwrap()
            .contains("not valid JSON"));
    }

    #[tokio::test]
    async fn test_status_reports_service() {
        let dir = tempfile::tempdir().unwrap();
        let Json(status) =
            status_handler(State(state_with_document(dir.path().join("x.json")))).await;
        assert_eq!(status.service, "federated-shell");
        assert!(!status.version.is_empty());
    }
}
