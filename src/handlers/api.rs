//! Handlers autenticados (`/api/*`)
//!
//! O `TokenRecord` já resolvido pelo Auth Gate chega via `Extension`.
//! Qualquer falha vira `{ "error": ... }` com mensagem fixa por rota.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::SecondsFormat;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::TokenRecord;
use crate::services::Pagination;
use crate::utils::logging::*;
use crate::utils::{error_response, AppResult};
use crate::AppState;

/// POST /api/tokens/refresh
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<TokenRecord>,
) -> Response {
    log_request_received("/api/tokens/refresh", "POST");

    match state.token_manager.refresh_access_token(Some(&token)).await {
        Ok(token) => Json(json!({
            "message": "Token refreshed successfully",
            "userId": token.id.to_hex(),
            "expiresAt": token.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            "accessToken": token.access_token,
        }))
        .into_response(),
        Err(e) => {
            log_error(&format!("❌ Error refreshing token: {}", e.log_detail()));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to refresh token")
        }
    }
}

/// GET /api/contacts?page=&limit=
pub async fn get_contacts(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<TokenRecord>,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Response {
    log_request_received("/api/contacts", "GET");
    let Query(pagination) = match pagination {
        Ok(query) => query,
        Err(rejection) => return query_rejected(rejection),
    };
    passthrough("contacts", state.resources.fetch_contacts(&token, &pagination).await)
}

/// GET /api/opportunities
pub async fn get_opportunities(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<TokenRecord>,
) -> Response {
    log_request_received("/api/opportunities", "GET");
    passthrough("opportunities", state.resources.fetch_opportunities(&token).await)
}

/// GET /api/users
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<TokenRecord>,
) -> Response {
    log_request_received("/api/users", "GET");
    passthrough("users", state.resources.fetch_users(&token).await)
}

/// GET /api/calendars
pub async fn get_calendars(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<TokenRecord>,
) -> Response {
    log_request_received("/api/calendars", "GET");
    passthrough("calendars", state.resources.fetch_calendars(&token).await)
}

/// GET /api/associations
pub async fn get_associations(
    State(state): State<Arc<AppState>>,
    Extension(token): Extension<TokenRecord>,
) -> Response {
    log_request_received("/api/associations", "GET");
    passthrough("associations", state.resources.fetch_associations(&token).await)
}

/// Corpo do upstream sem alteração, ou 500 `Failed to fetch <recurso>`
fn passthrough(resource: &str, result: AppResult<Value>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            log_error(&format!("❌ Error fetching {}: {}", resource, e.log_detail()));
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch {}", resource),
            )
        }
    }
}

/// Query string inválida vira 400 no envelope `{ "error": ... }`
pub(crate) fn query_rejected(rejection: QueryRejection) -> Response {
    log_warning(&format!("⚠️ Query string rejeitada: {}", rejection.body_text()));
    error_response(StatusCode::BAD_REQUEST, rejection.body_text())
}
