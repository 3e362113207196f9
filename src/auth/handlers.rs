//! OAuth2 HTTP Handlers
//!
//! Endpoints HTTP para iniciar e completar o fluxo OAuth2

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::SecondsFormat;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::handlers::api::query_rejected;
use crate::utils::logging::*;
use crate::utils::{error_response, truncate_safe};
use crate::AppState;

/// Parâmetros do callback OAuth2
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    /// Authorization code retornado pela HighLevel
    code: Option<String>,
    /// Erro retornado pelo provedor (se houver)
    error: Option<String>,
}

/// GET /auth/authorize
///
/// Redireciona (302) para a página de autorização do marketplace
pub async fn start_oauth_flow(State(state): State<Arc<AppState>>) -> Response {
    log_info("🚀 [OAuth2] Iniciando fluxo de autorização...");

    let auth_url = state.token_manager.authorization_url();

    log_info(&format!("↗️  [OAuth2] Redirecionando para: {}", auth_url));

    (StatusCode::FOUND, [(header::LOCATION, auth_url)]).into_response()
}

/// GET /auth/callback?code=XXX
///
/// Troca o code por tokens e devolve os dados do registro persistido
///
/// # Respostas
/// - **200**: `{message, tokenId, expiresAt, userId, accessToken}`
/// - **400**: code ausente ou query string inválida
/// - **500**: falha no exchange
pub async fn handle_oauth_callback(
    State(state): State<Arc<AppState>>,
    params: Result<Query<OAuthCallbackParams>, QueryRejection>,
) -> Response {
    log_info("📥 [OAuth2] Callback recebido");

    let Query(params) = match params {
        Ok(query) => query,
        Err(rejection) => return query_rejected(rejection),
    };

    if let Some(error) = params.error.as_deref() {
        log_warning(&format!("⚠️ [OAuth2] Provedor retornou erro na autorização: {}", error));
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        log_error("❌ [OAuth2] Code não recebido no callback");
        return error_response(StatusCode::BAD_REQUEST, "Authorization code is required");
    };

    log_info(&format!("🔑 [OAuth2] Code recebido: {}...", truncate_safe(&code, 10)));

    match state.token_manager.exchange_code_for_token(&code).await {
        Ok(token) => {
            log_info(&format!("✅ [OAuth2] Autorização concluída: {}", token.id.to_hex()));
            Json(json!({
                "message": "Authorization successful",
                "tokenId": token.id.to_hex(),
                "expiresAt": token.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                "userId": token.user_id,
                "accessToken": token.access_token,
            }))
            .into_response()
        }
        Err(e) => {
            log_error(&format!("❌ [OAuth2] Error in callback: {}", e.log_detail()));
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to exchange code for token")
        }
    }
}
