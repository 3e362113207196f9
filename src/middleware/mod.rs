/// Middleware layer para o Axum router
///
/// - Autenticação por bearer token das rotas `/api/*`

pub mod bearer_auth;

pub use bearer_auth::require_bearer_token;
