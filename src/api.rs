use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::error::ReadmeError;
use crate::orchestrator::{GenerateRequest, GenerateResponse, Orchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    start_time: DateTime<Utc>,
}

impl AppState {
    /// Creates state around a wired orchestrator
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Current status
    pub status: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
    /// Service uptime in seconds
    pub uptime: u64,
    /// Number of live editing sessions
    pub active_sessions: usize,
}

impl IntoResponse for ReadmeError {
    fn into_response(self) -> Response {
        if self.kind() == "server_error" {
            error!(error = %self, "unexpected error");
        }

        let mut payload = json!({
            "message": self.user_message(),
            "kind": self.kind(),
        });
        if let Some(suggestion) = self.suggestion() {
            payload["suggestion"] = json!(suggestion);
        }
        (self.status_code(), Json(payload)).into_response()
    }
}

/// Builds the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/generate-readme", post(generate))
        .route("/api/generate", post(generate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        service: "readmeforge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "healthy".to_string(),
        timestamp: now,
        uptime: (now - state.start_time).num_seconds().max(0) as u64,
        active_sessions: state.orchestrator.sessions().len().await,
    })
}

/// Generation endpoint
async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ReadmeError> {
    let Json(request) = payload.map_err(|e| ReadmeError::MalformedRequest(e.body_text()))?;

    let response = state.orchestrator.handle(request).await?;
    info!(
        mode = %response.mode,
        repository = response.repository_name.as_deref().unwrap_or("-"),
        "document generated"
    );
    Ok(Json(response))
}
