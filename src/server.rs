//! HTTP API for scene generation.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use log::{error, info};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::ApiError;
use crate::scene::{ScenePipeline, Script};

/// Shared state: the pipeline is read-only after startup
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ScenePipeline>,
}

/// Creates the API router.
pub fn create_router(pipeline: Arc<ScenePipeline>) -> Router {
    Router::new()
        .route("/generate_scene", post(generate_scene))
        .route("/health", get(health_check))
        .with_state(AppState { pipeline })
}

/// Bind and serve until Ctrl-C.
pub async fn serve(pipeline: Arc<ScenePipeline>, host: &str, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Generate a script from a single-sentence prompt.
async fn generate_scene(State(state): State<AppState>, body: Bytes) -> Result<Json<Script>, ApiError> {
    let prompt = extract_prompt(&body)?;
    let script = state.pipeline.run_pipeline(&prompt).await?;
    Ok(Json(script))
}

/// Health check endpoint, reporting which providers are in use.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.pipeline.status();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "llm_provider": status.active_llm,
            "search": status.search_configured,
        })),
    )
}

/// Pull the `prompt` string out of a request body.
pub fn extract_prompt(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MissingPrompt)?;
    value
        .get("prompt")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ApiError::MissingPrompt)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingPrompt => StatusCode::BAD_REQUEST,
            ApiError::Internal(e) => {
                error!("Scene generation failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
