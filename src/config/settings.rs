use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};

pub const DEFAULT_MARKETPLACE_URL: &str = "https://marketplace.leadconnectorhq.com";
pub const DEFAULT_SERVICE_URL: &str = "https://services.leadconnectorhq.com";
pub const DEFAULT_API_VERSION: &str = "2021-07-28";
pub const DEFAULT_SCOPE: &str =
    "contacts.readonly calendars.readonly associations.readonly opportunities.readonly users.readonly";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub ghl: GhlSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// Connection string do MongoDB (`memory://` usa o store em memória)
    pub uri: String,
    pub name: String,
    pub collection: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GhlSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub marketplace_url: String,
    pub service_url: String,
    pub api_version: String,
    pub scope: String,
    pub timeout_seconds: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("database.name", "ghl_integration")?
            .set_default("database.collection", "tokens")?
            .set_default("ghl.marketplace_url", DEFAULT_MARKETPLACE_URL)?
            .set_default("ghl.service_url", DEFAULT_SERVICE_URL)?
            .set_default("ghl.api_version", DEFAULT_API_VERSION)?
            .set_default("ghl.scope", DEFAULT_SCOPE)?
            .set_default("ghl.timeout_seconds", 30)?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente "clássicas" do serviço
        let overrides = [
            ("PORT", "server.port"),
            ("MONGODB_URI", "database.uri"),
            ("GHL_CLIENT_ID", "ghl.client_id"),
            ("GHL_CLIENT_SECRET", "ghl.client_secret"),
            ("GHL_REDIRECT_URI", "ghl.redirect_uri"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder = builder.add_source(Environment::with_prefix("GHL_BROKER").separator("__"));

        let s = builder.build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Valores obrigatórios não podem vir vazios (ex.: `GHL_CLIENT_ID=` no .env)
    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("database.uri", &self.database.uri),
            ("ghl.client_id", &self.ghl.client_id),
            ("ghl.client_secret", &self.ghl.client_secret),
            ("ghl.redirect_uri", &self.ghl.redirect_uri),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(ConfigError::Message(format!("{} must not be empty", key))),
            None => Ok(()),
        }
    }
}
