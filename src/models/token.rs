//! Token record persistido e resposta do endpoint `/oauth/token`

use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{AppError, AppResult};

/// Janela de antecedência para renovar o access token (5 minutos)
pub const EXPIRATION_BUFFER_SECS: i64 = 5 * 60;

/// Registro de token - única entidade persistida
///
/// Os nomes de campo em camelCase são os mesmos da coleção `tokens` já existente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Resposta do endpoint de token (exchange e refresh)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
    #[serde(rename = "locationId", default)]
    pub location_id: Option<String>,
    #[serde(rename = "companyId", default)]
    pub company_id: Option<String>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl TokenResponse {
    /// Instante de expiração relativo ao momento em que a resposta foi recebida
    ///
    /// `expires_in` vem do provedor: fora do intervalo de datas é resposta malformada.
    pub fn expires_at(&self, received_at: DateTime<Utc>) -> AppResult<DateTime<Utc>> {
        Duration::try_seconds(self.expires_in)
            .and_then(|ttl| received_at.checked_add_signed(ttl))
            .ok_or_else(|| AppError::upstream_auth(format!("expires_in out of range: {}", self.expires_in)))
    }

    /// Refresh token novo, se o provedor enviou um não vazio
    pub fn new_refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl TokenRecord {
    /// Primeiro exchange para um usuário: registro novo com todos os campos
    pub fn new_from_exchange(response: &TokenResponse, refresh_token: &str, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            id: ObjectId::new(),
            access_token: response.access_token.clone(),
            refresh_token: refresh_token.to_string(),
            expires_at: response.expires_at(now)?,
            location_id: response.location_id.clone(),
            company_id: response.company_id.clone(),
            user_id: response.user_id.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Exchange repetido para o mesmo usuário: mantém identidade, sobrescreve credenciais
    pub fn apply_exchange(&self, response: &TokenResponse, refresh_token: &str, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            access_token: response.access_token.clone(),
            refresh_token: refresh_token.to_string(),
            expires_at: response.expires_at(now)?,
            location_id: response.location_id.clone(),
            company_id: response.company_id.clone(),
            updated_at: now,
            ..self.clone()
        })
    }

    /// Refresh: access token e expiração sempre mudam; refresh token só se vier um novo
    pub fn apply_refresh(&self, response: &TokenResponse, now: DateTime<Utc>) -> AppResult<Self> {
        let refresh_token = response
            .new_refresh_token()
            .map(str::to_string)
            .unwrap_or_else(|| self.refresh_token.clone());

        Ok(Self {
            access_token: response.access_token.clone(),
            refresh_token,
            expires_at: response.expires_at(now)?,
            updated_at: now,
            ..self.clone()
        })
    }

    /// `true` quando o token expira agora ou dentro da janela de 5 minutos
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + Duration::seconds(EXPIRATION_BUFFER_SECS)
    }
}
