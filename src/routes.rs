//! Composição do router
//!
//! - `/`, `/health`: públicos
//! - `/auth/*`: fluxo OAuth2 (público)
//! - `/api/*`: protegidos pelo bearer token

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{handle_oauth_callback, start_oauth_flow};
use crate::handlers::{
    get_associations, get_calendars, get_contacts, get_opportunities, get_users, health_check,
    refresh_token, root,
};
use crate::middleware::require_bearer_token;
use crate::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/authorize", get(start_oauth_flow))
        .route("/callback", get(handle_oauth_callback));

    let api_routes = Router::new()
        .route("/tokens/refresh", post(refresh_token))
        .route("/contacts", get(get_contacts))
        .route("/opportunities", get(get_opportunities))
        .route("/users", get(get_users))
        .route("/calendars", get(get_calendars))
        .route("/associations", get(get_associations))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer_token));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
