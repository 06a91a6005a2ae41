use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - Service info
pub async fn root(State(state): State<AppState>) -> ApiResult<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Ok(ApiResponse::success(json!({
        "name": "Listing Query API",
        "version": version,
        "description": "Filtered, sorted and paginated listings over query-string parameters",
        "collections": state.catalog.names(),
        "endpoints": {
            "home": "/",
            "health": "/health",
            "collections": "/api/collections",
            "listing": "/api/:collection?<filters>&sortBy=&order=&limit=&skip=",
        }
    })))
}

/// GET /health - Liveness plus store reachability
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let now = chrono::Utc::now();

    state.executor.health_check().await.map_err(|e| {
        tracing::warn!("Health check failed: {}", e);
        ApiError::service_unavailable("database unavailable")
    })?;

    Ok(ApiResponse::success(json!({
        "status": "ok",
        "timestamp": now,
        "database": "ok"
    })))
}
