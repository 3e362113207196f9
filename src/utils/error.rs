use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Taxonomia de erros do broker
///
/// As variantes de upstream guardam o detalhe (status, corpo, endpoint) apenas
/// para log; o `Display` é genérico e nunca vaza para o cliente.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Token is required")]
    MissingToken,

    #[error("Invalid token provided")]
    InvalidToken,

    #[error("Location ID is required")]
    MissingLocation,

    #[error("Failed to authenticate with the OAuth provider")]
    UpstreamAuth { detail: String },

    #[error("Upstream API request failed")]
    UpstreamRequest {
        endpoint: String,
        status: Option<u16>,
        detail: String,
    },

    #[error("Token store error")]
    Store(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl AppError {
    pub fn upstream_auth(detail: impl Into<String>) -> Self {
        Self::UpstreamAuth {
            detail: detail.into(),
        }
    }

    pub fn upstream_request(endpoint: impl Into<String>, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::UpstreamRequest {
            endpoint: endpoint.into(),
            status,
            detail: detail.into(),
        }
    }

    /// Status HTTP correspondente a cada variante
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::ConfigError(_)
            | AppError::MissingToken
            | AppError::MissingLocation
            | AppError::UpstreamAuth { .. }
            | AppError::UpstreamRequest { .. }
            | AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Detalhe interno para log (nunca enviado ao cliente)
    pub fn log_detail(&self) -> String {
        match self {
            AppError::UpstreamAuth { detail } => format!("{} ({})", self, detail),
            AppError::UpstreamRequest { endpoint, status, detail } => {
                format!("{} - endpoint: {} - status: {:?} - {}", self, endpoint, status, detail)
            }
            AppError::Store(detail) => format!("{}: {}", self, detail),
            _ => self.to_string(),
        }
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err.url().map(|u| u.path().to_string()).unwrap_or_default();
        let status = err.status().map(|s| s.as_u16());
        AppError::upstream_request(endpoint, status, err.to_string())
    }
}

/// Envelope padrão `{ "error": <mensagem> }`
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
