//! Testes end-to-end da superfície HTTP
//!
//! Router real + store em memória + API da HighLevel simulada com httpmock.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use ghl_integration_api::{
    auth::{OAuth2Config, TokenManager},
    config::{settings::DEFAULT_SCOPE, DatabaseSettings, GhlSettings, ServerSettings, Settings},
    models::{TokenRecord, TokenResponse},
    routes::build_router,
    services::{GhlApiClient, GhlResources},
    store::{InMemoryTokenStore, TokenStore},
    AppState,
};

fn settings(service_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseSettings {
            uri: "memory://".to_string(),
            name: "ghl_integration".to_string(),
            collection: "tokens".to_string(),
        },
        ghl: GhlSettings {
            client_id: "cid".to_string(),
            client_secret: "csecret".to_string(),
            redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            marketplace_url: "https://marketplace.leadconnectorhq.com".to_string(),
            service_url: service_url.to_string(),
            api_version: "2021-07-28".to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            timeout_seconds: 5,
        },
    }
}

fn app(server: &MockServer, store: Arc<InMemoryTokenStore>) -> Router {
    let settings = settings(&server.base_url());
    let api = Arc::new(GhlApiClient::from_settings(&settings.ghl).unwrap());
    let token_manager = Arc::new(TokenManager::new(
        OAuth2Config::from_settings(&settings.ghl),
        api.clone(),
        store,
    ));

    build_router(Arc::new(AppState {
        settings,
        token_manager,
        resources: GhlResources::new(api),
    }))
}

fn record(access: &str, location: Option<&str>, expires_in: i64) -> TokenRecord {
    let response = TokenResponse {
        access_token: access.to_string(),
        refresh_token: Some("RT1".to_string()),
        expires_in,
        location_id: location.map(str::to_string),
        company_id: Some("C1".to_string()),
        user_id: Some("U1".to_string()),
    };
    TokenRecord::new_from_exchange(&response, "RT1", Utc::now()).unwrap()
}

async fn seeded_store(token: &TokenRecord) -> Arc<InMemoryTokenStore> {
    let store = Arc::new(InMemoryTokenStore::new());
    store.save(token).await.unwrap();
    store
}

fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_liveness() {
    let server = MockServer::start_async().await;
    let response = app(&server, Arc::new(InMemoryTokenStore::new()))
        .oneshot(get("/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"GHL Integration API is running");
}

#[tokio::test]
async fn test_authorize_redirects_to_marketplace() {
    let server = MockServer::start_async().await;
    let response = app(&server, Arc::new(InMemoryTokenStore::new()))
        .oneshot(get("/auth/authorize", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers()[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("https://marketplace.leadconnectorhq.com/oauth/chooselocation?response_type=code"));
    assert!(location.contains("client_id=cid"));
}

#[tokio::test]
async fn test_callback_without_code_is_bad_request() {
    let server = MockServer::start_async().await;
    let response = app(&server, Arc::new(InMemoryTokenStore::new()))
        .oneshot(get("/auth/callback", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Authorization code is required" }));
}

#[tokio::test]
async fn test_callback_exchanges_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token").body_contains("code=code123");
            then.status(200).json_body(json!({
                "access_token": "AT1",
                "refresh_token": "RT1",
                "expires_in": 3600,
                "locationId": "L1",
                "companyId": "C1",
                "userId": "U1"
            }));
        })
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let response = app(&server, store.clone())
        .oneshot(get("/auth/callback?code=code123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Authorization successful");
    assert_eq!(body["accessToken"], "AT1");
    assert_eq!(body["userId"], "U1");

    let stored = store.find_by_access_token("AT1").await.unwrap().unwrap();
    assert_eq!(body["tokenId"], stored.id.to_hex());
}

#[tokio::test]
async fn test_callback_exchange_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(400).json_body(json!({ "error": "invalid_grant" }));
        })
        .await;

    let response = app(&server, Arc::new(InMemoryTokenStore::new()))
        .oneshot(get("/auth/callback?code=expired", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to exchange code for token" }));
}

#[tokio::test]
async fn test_callback_out_of_range_expires_in_returns_error_envelope() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({
                "access_token": "AT1",
                "refresh_token": "RT1",
                "expires_in": 9_000_000_000_000_000_i64,
                "userId": "U1"
            }));
        })
        .await;

    let store = Arc::new(InMemoryTokenStore::new());
    let response = app(&server, store.clone())
        .oneshot(get("/auth/callback?code=code123", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to exchange code for token" }));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_callback_duplicate_code_is_json_bad_request() {
    let server = MockServer::start_async().await;
    let response = app(&server, Arc::new(InMemoryTokenStore::new()))
        .oneshot(get("/auth/callback?code=a&code=b", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_api_routes_require_authorization_header() {
    let server = MockServer::start_async().await;
    let router = app(&server, Arc::new(InMemoryTokenStore::new()));

    for uri in ["/api/contacts", "/api/opportunities", "/api/users", "/api/calendars", "/api/associations"] {
        let response = router.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(
            json_body(response).await,
            json!({ "error": "Authorization header with Bearer token is required" })
        );
    }

    let refresh = Request::builder()
        .method(Method::POST)
        .uri("/api/tokens/refresh")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(refresh).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_bearer_credential() {
    let server = MockServer::start_async().await;
    let request = Request::builder()
        .uri("/api/users")
        .header(header::AUTHORIZATION, "Bearer ")
        .body(Body::empty())
        .unwrap();

    let response = app(&server, Arc::new(InMemoryTokenStore::new()))
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({ "error": "Valid Bearer token is required" }));
}

#[tokio::test]
async fn test_unknown_bearer_token() {
    let server = MockServer::start_async().await;
    let response = app(&server, Arc::new(InMemoryTokenStore::new()))
        .oneshot(get("/api/users", Some("nope")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid token provided" }));
}

#[tokio::test]
async fn test_opportunities_without_location_id() {
    let server = MockServer::start_async().await;
    let token = record("AT1", None, 3600);
    let response = app(&server, seeded_store(&token).await)
        .oneshot(get("/api/opportunities", Some("AT1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to fetch opportunities" }));
}

#[tokio::test]
async fn test_contacts_passthrough() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/contacts")
                .query_param("page", "1")
                .query_param("limit", "5")
                .query_param("locationId", "L1")
                .header("Authorization", "Bearer AT1");
            then.status(200).json_body(json!({ "contacts": [{ "id": "c1" }], "meta": { "total": 1 } }));
        })
        .await;

    let token = record("AT1", Some("L1"), 3600);
    let response = app(&server, seeded_store(&token).await)
        .oneshot(get("/api/contacts?page=1&limit=5", Some("AT1")))
        .await
        .unwrap();

    upstream.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "contacts": [{ "id": "c1" }], "meta": { "total": 1 } })
    );
}

#[tokio::test]
async fn test_contacts_invalid_query_is_json_bad_request() {
    let server = MockServer::start_async().await;
    let upstream = server
        .mock_async(|when, then| {
            when.path("/contacts");
            then.status(200).json_body(json!({ "contacts": [] }));
        })
        .await;

    let token = record("AT1", Some("L1"), 3600);
    let response = app(&server, seeded_store(&token).await)
        .oneshot(get("/api/contacts?page=1&page=2", Some("AT1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].is_string());
    assert_eq!(upstream.hits_async().await, 0);
}

#[tokio::test]
async fn test_upstream_failure_is_wrapped() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/calendars/");
            then.status(503).body("upstream down");
        })
        .await;

    let token = record("AT1", Some("L1"), 3600);
    let response = app(&server, seeded_store(&token).await)
        .oneshot(get("/api/calendars", Some("AT1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to fetch calendars" }));
}

#[tokio::test]
async fn test_near_expiry_token_is_refreshed_before_forwarding() {
    let server = MockServer::start_async().await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token").body_contains("grant_type=refresh_token");
            then.status(200).json_body(json!({ "access_token": "AT2", "expires_in": 3600 }));
        })
        .await;
    let users = server
        .mock_async(|when, then| {
            when.method(GET).path("/users/").header("Authorization", "Bearer AT2");
            then.status(200).json_body(json!({ "users": [] }));
        })
        .await;

    let token = record("AT1", Some("L1"), 60);
    let response = app(&server, seeded_store(&token).await)
        .oneshot(get("/api/users", Some("AT1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    refresh.assert_async().await;
    users.assert_async().await;
}

#[tokio::test]
async fn test_refresh_route() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token").body_contains("refresh_token=RT1");
            then.status(200).json_body(json!({ "access_token": "AT2", "refresh_token": "RT2", "expires_in": 3600 }));
        })
        .await;

    let token = record("AT1", Some("L1"), 3600);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tokens/refresh")
        .header(header::AUTHORIZATION, "Bearer AT1")
        .body(Body::empty())
        .unwrap();

    let response = app(&server, seeded_store(&token).await).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Token refreshed successfully");
    assert_eq!(body["accessToken"], "AT2");
    assert_eq!(body["userId"], token.id.to_hex());
}

#[tokio::test]
async fn test_refresh_route_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(400).json_body(json!({ "error": "invalid_grant" }));
        })
        .await;

    let token = record("AT1", Some("L1"), 3600);
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/tokens/refresh")
        .header(header::AUTHORIZATION, "Bearer AT1")
        .body(Body::empty())
        .unwrap();

    let response = app(&server, seeded_store(&token).await).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "Failed to refresh token" }));
}
