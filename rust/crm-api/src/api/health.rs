//! Health and readiness endpoints. Unauthenticated.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct ReadyResponse {
    status: &'static str,
    database: &'static str,
    assistant: &'static str,
}

async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    let assistant = if state.assistant.is_some() {
        "configured"
    } else {
        "disabled"
    };
    Json(ReadyResponse {
        status: "ready",
        database: "initialized",
        assistant,
    })
}
