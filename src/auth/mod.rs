//! # HighLevel OAuth2 Authentication Module
//!
//! Módulo isolado para gerenciar autenticação OAuth2 com a API da HighLevel.
//!
//! ## Responsabilidades:
//! - Iniciar fluxo OAuth2 (authorization URL)
//! - Trocar authorization code por access/refresh token
//! - Renovar tokens perto da expiração (buffer de 5 minutos)
//! - Fornecer tokens válidos para o proxy de recursos
//!
//! ## Estrutura:
//! - `config.rs`: Configurações OAuth2
//! - `token_manager.rs`: Ciclo de vida dos tokens
//! - `handlers.rs`: Handlers HTTP (authorize, callback)

pub mod config;
pub mod token_manager;
pub mod handlers;

pub use config::OAuth2Config;
pub use token_manager::TokenManager;
pub use handlers::{start_oauth_flow, handle_oauth_callback};
