use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

/// GET / - liveness em texto puro
pub async fn root() -> &'static str {
    "GHL Integration API is running"
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    Json(json!({
        "status": "healthy",
        "service": "ghl-integration-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "upstream": {
            "service_url": state.settings.ghl.service_url,
            "api_version": state.settings.ghl.api_version
        }
    }))
}
