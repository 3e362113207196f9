//! Cliente HTTP para a API da HighLevel
//!
//! Três primitivas, todas sobre o mesmo `reqwest::Client` injetado no construtor:
//! - `make_authenticated_request`: Bearer + header `Version`, injeta `locationId`
//! - `make_request`: mesma coisa sem autenticação
//! - `make_token_request`: POST form-urlencoded para os fluxos OAuth

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::GhlSettings;
use crate::models::TokenRecord;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

/// Opções de uma requisição à API
///
/// | Campo | Default |
/// |---|---|
/// | `method` | `GET` |
/// | `data` | nenhum corpo |
/// | `params` | sem query string extra |
/// | `headers` | só os headers padrão |
/// | `location_id` | `locationId` do token |
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub data: Option<Value>,
    pub params: BTreeMap<String, String>,
    pub headers: HashMap<String, String>,
    pub location_id: Option<String>,
}

impl RequestOptions {
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Acrescenta `locationId=<id>` ao endpoint, a não ser que o endpoint ou os
/// params já tragam `locationId`/`location_id`.
pub fn scope_endpoint_to_location(
    endpoint: &str,
    params: &BTreeMap<String, String>,
    location_id: Option<&str>,
) -> String {
    let Some(location_id) = location_id.filter(|l| !l.is_empty()) else {
        return endpoint.to_string();
    };

    let already_scoped = endpoint.contains("locationId=")
        || endpoint.contains("location_id=")
        || params.contains_key("locationId")
        || params.contains_key("location_id");

    if already_scoped {
        return endpoint.to_string();
    }

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}locationId={}", endpoint, separator, location_id)
}

/// Cliente da API HighLevel
#[derive(Debug, Clone)]
pub struct GhlApiClient {
    http_client: Client,
    base_url: String,
    api_version: String,
}

impl GhlApiClient {
    pub fn new(http_client: Client, base_url: impl Into<String>, api_version: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_version: api_version.into(),
        }
    }

    /// Constrói o cliente a partir das settings (timeout incluso)
    pub fn from_settings(settings: &GhlSettings) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new(http_client, &settings.service_url, &settings.api_version))
    }

    /// Requisição autenticada com o access token do registro
    ///
    /// # Retorno
    /// - `Ok(Value)`: corpo da resposta, repassado sem alteração
    /// - `Err(AppError::MissingToken)`: nenhum token informado
    /// - `Err(AppError::UpstreamRequest)`: falha de rede ou status não-2xx
    pub async fn make_authenticated_request(
        &self,
        endpoint: &str,
        options: RequestOptions,
        token: Option<&TokenRecord>,
    ) -> AppResult<Value> {
        let token = token.ok_or(AppError::MissingToken)?;

        let location_id = options
            .location_id
            .as_deref()
            .or(token.location_id.as_deref());
        let endpoint = scope_endpoint_to_location(endpoint, &options.params, location_id);

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.access_token))
            .map_err(|_| AppError::ValidationError("Access token is not a valid header value".to_string()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            HeaderName::from_static("version"),
            HeaderValue::from_str(&self.api_version)
                .map_err(|_| AppError::ConfigError("Invalid API version header".to_string()))?,
        );
        merge_headers(&mut headers, &options.headers)?;

        self.send(&endpoint, options.method, headers, options.data, &options.params)
            .await
            .map_err(|e| {
                log_error(&format!("❌ [GhlApi] Error making authenticated request to {}: {}", endpoint, e.log_detail()));
                e
            })
    }

    /// Requisição sem autenticação
    pub async fn make_request(&self, endpoint: &str, options: RequestOptions) -> AppResult<Value> {
        let mut headers = HeaderMap::new();
        merge_headers(&mut headers, &options.headers)?;

        self.send(endpoint, options.method, headers, options.data, &options.params)
            .await
            .map_err(|e| {
                log_error(&format!("❌ [GhlApi] Error making request to {}: {}", endpoint, e.log_detail()));
                e
            })
    }

    /// POST `application/x-www-form-urlencoded` (exchange/refresh de token)
    pub async fn make_token_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let result = async {
            let response = self
                .http_client
                .post(&url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .form(form)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                return Err(AppError::upstream_request(endpoint, Some(status.as_u16()), error_text));
            }

            response.json::<T>().await.map_err(|e| {
                AppError::upstream_request(endpoint, Some(status.as_u16()), format!("Malformed token response: {}", e))
            })
        }
        .await;

        result.map_err(|e| {
            log_error(&format!("❌ [GhlApi] Error making token request to {}: {}", endpoint, e.log_detail()));
            e
        })
    }

    async fn send(
        &self,
        endpoint: &str,
        method: Method,
        headers: HeaderMap,
        data: Option<Value>,
        params: &BTreeMap<String, String>,
    ) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self.http_client.request(method, &url).headers(headers);

        if let Some(data) = data {
            request = request.json(&data);
        }
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log_upstream_error(endpoint, Some(status.as_u16()), &error_text);
            return Err(AppError::upstream_request(endpoint, Some(status.as_u16()), error_text));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
    }
}

/// Headers do chamador têm precedência sobre os padrão
fn merge_headers(headers: &mut HeaderMap, extra: &HashMap<String, String>) -> AppResult<()> {
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| AppError::ValidationError(format!("Invalid header name: {}", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| AppError::ValidationError(format!("Invalid header value for {}", name)))?;
        headers.insert(name, value);
    }
    Ok(())
}
