use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;
use serde_json::json;

use crate::AppState;

/// Liveness probe: the process is up.
async fn liveness() -> impl IntoResponse {
    Json(json!({
        "status": "up",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe: the database answers a ping.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "ready", "database": "up"})),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not_ready", "database": e.to_string()})),
        ),
    }
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(liveness))
        .route("/health/ready", get(readiness))
}
