// handlers/public/status.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn root_get() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Job Tracker API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Kanban boards for tracking job applications",
            "endpoints": {
                "auth": "/auth/register, /auth/login (public)",
                "profile": "/profile (protected)",
                "boards": "/boards[/:id] (protected)",
                "lists": "/lists[/:id] (protected)",
                "cards": "/cards[/:id][/move] (protected)",
            }
        }
    }))
}

pub async fn health_get(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
