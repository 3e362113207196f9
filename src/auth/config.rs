//! OAuth2 Configuration
//!
//! Centraliza todas as configurações necessárias para OAuth2 da HighLevel

use serde::{Deserialize, Serialize};

use crate::config::GhlSettings;

/// Endpoint de token (no host de serviços)
pub const TOKEN_ENDPOINT: &str = "/oauth/token";

/// Página de escolha de location no marketplace
pub const AUTHORIZE_PATH: &str = "/oauth/chooselocation";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// Client ID do app no marketplace
    pub client_id: String,

    /// Client Secret do app no marketplace
    pub client_secret: String,

    /// URL de callback registrada no app
    pub redirect_uri: String,

    /// Host do marketplace (tela de autorização)
    pub marketplace_url: String,

    /// Escopos separados por espaço
    pub scope: String,
}

impl OAuth2Config {
    pub fn from_settings(settings: &GhlSettings) -> Self {
        Self {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            marketplace_url: settings.marketplace_url.trim_end_matches('/').to_string(),
            scope: settings.scope.clone(),
        }
    }

    /// Gerar URL de autorização da HighLevel
    pub fn authorization_url(&self) -> String {
        format!(
            "{}{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
            self.marketplace_url,
            AUTHORIZE_PATH,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope)
        )
    }
}
