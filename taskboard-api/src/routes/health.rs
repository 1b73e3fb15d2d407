/// API banner and health check endpoints
///
/// # Endpoints
///
/// - `GET /` - Banner confirming the API is up (public)
/// - `GET /health` - Health status including database connectivity (public)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,
}

/// Root banner handler
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Task API is running" }))
}

/// Health check handler
///
/// Returns service health status including database connectivity.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database_status = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Ok(Json(HealthResponse {
        status: if database_status == "connected" {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database_status.to_string(),
    }))
}
