/// Auth Gate para as rotas `/api/*`
///
/// Exige `Authorization: Bearer <token>`, resolve o token (renovando se
/// necessário) e anexa o `TokenRecord` às extensions da requisição.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::utils::{error_response, mask_credential};
use crate::AppState;

/// Extrai a credencial de um header `Bearer <token>`
///
/// - `None`: header ausente ou sem o esquema Bearer
/// - `Some("")`: esquema presente, credencial vazia
pub fn bearer_credential(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let rest = value.strip_prefix("Bearer ")?;
    Some(rest.split(' ').next().unwrap_or_default())
}

/// Middleware que resolve o bearer token em um registro válido
///
/// # Respostas
///
/// - **401**: header ausente, credencial vazia, ou token desconhecido/irrenovável
pub async fn require_bearer_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let credential = bearer_credential(&headers)
        .ok_or_else(|| unauthorized("Authorization header with Bearer token is required"))?;

    if credential.is_empty() {
        return Err(unauthorized("Valid Bearer token is required"));
    }

    match state.token_manager.get_valid_token(credential).await {
        Ok(token) => {
            tracing::debug!("✅ Bearer token resolvido para o registro {}", token.id.to_hex());
            request.extensions_mut().insert(token);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(
                "❌ Bearer token rejeitado ({}): {}",
                mask_credential(credential),
                e.log_detail()
            );
            let message = e.to_string();
            Err(unauthorized(if message.is_empty() { "Unauthorized" } else { message.as_str() }))
        }
    }
}

fn unauthorized(message: &str) -> Response {
    error_response(StatusCode::UNAUTHORIZED, message)
}
