// handlers/mod.rs - route table
//
// Public:    GET /, GET /health
// Dashboard: GET /dashboard (session cookie, redirects to login when absent)

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub mod dashboard;

pub use dashboard::{dashboard_get, DashboardPayload};

pub fn app(state: AppState) -> Router {
    let enable_cors = state.config.server.enable_cors;

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Dashboard surface
        .route("/dashboard", get(dashboard_get))
        .with_state(state);

    // Global middleware
    let router = if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };
    router.layer(TraceLayer::new_for_http())
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Studio Dashboard",
            "version": version,
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "dashboard": "/dashboard (session cookie)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let database = match &state.database {
        Some(database) => database.health_check().await.map(|_| "ok"),
        None => Ok("memory"),
    };

    match database {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": status
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
