/// Main Application: broker OAuth2 + proxy read-only da HighLevel
///
/// Fluxo:
/// - `/auth/authorize` e `/auth/callback` obtêm e persistem tokens
/// - `/api/*` resolve o bearer token (renovando se necessário) e repassa
///   a chamada para a API da HighLevel

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ghl_integration_api::{
    auth::{OAuth2Config, TokenManager},
    config::Settings,
    routes::build_router,
    services::{GhlApiClient, GhlResources},
    store::{InMemoryTokenStore, MongoTokenStore, TokenStore},
    utils::logging::*,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // Inicializar tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if dotenv_loaded {
        tracing::info!("✅ Arquivo .env carregado com sucesso");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    // Carregar configurações (credenciais ausentes = erro de configuração no startup)
    let settings = Settings::new().context("Failed to load settings")?;

    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let store: Arc<dyn TokenStore> = if settings.database.uri.starts_with("memory://") {
        log_warning("⚠️ Usando token store em memória - tokens não sobrevivem a restart");
        Arc::new(InMemoryTokenStore::new())
    } else {
        let mongo = MongoTokenStore::connect(
            &settings.database.uri,
            &settings.database.name,
            &settings.database.collection,
        )
        .await
        .context("Failed to connect to MongoDB")?;
        mongo.ensure_indexes().await.context("Failed to create token indexes")?;
        Arc::new(mongo)
    };

    // Um único cliente HTTP, injetado no TokenManager e no proxy de recursos
    let api = Arc::new(GhlApiClient::from_settings(&settings.ghl).context("Failed to build GHL client")?);

    let token_manager = Arc::new(TokenManager::new(
        OAuth2Config::from_settings(&settings.ghl),
        api.clone(),
        store,
    ));
    log_info("✅ OAuth2 TokenManager initialized");

    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        token_manager,
        resources: GhlResources::new(api),
    });

    let app = build_router(app_state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("Failed to bind {}", addr))?;

    log_server_startup(settings.server.port);
    log_server_ready(settings.server.port);

    // Graceful shutdown com signal handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("Failed to install Ctrl+C handler: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("Failed to install SIGTERM handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
