//! Proxy read-only para os recursos da HighLevel
//!
//! Cada operação monta o endpoint fixo e delega para
//! `GhlApiClient::make_authenticated_request`; os erros sobem sem alteração.

use std::sync::Arc;

use serde_json::Value;

use super::api_client::{GhlApiClient, RequestOptions};
use crate::models::TokenRecord;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

/// Paginação opcional de `/contacts`
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Pagination {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GhlResources {
    api: Arc<GhlApiClient>,
}

impl GhlResources {
    pub fn new(api: Arc<GhlApiClient>) -> Self {
        Self { api }
    }

    pub async fn fetch_contacts(&self, token: &TokenRecord, pagination: &Pagination) -> AppResult<Value> {
        let mut options = RequestOptions::default();
        if let Some(page) = pagination.page.as_deref().filter(|p| !p.is_empty()) {
            options = options.with_param("page", page);
        }
        if let Some(limit) = pagination.limit.as_deref().filter(|l| !l.is_empty()) {
            options = options.with_param("limit", limit);
        }

        self.fetch("contacts", "/contacts", options, token).await
    }

    /// Exige `locationId` no token
    pub async fn fetch_opportunities(&self, token: &TokenRecord) -> AppResult<Value> {
        let location_id = token.location_id.as_deref().filter(|l| !l.is_empty()).ok_or_else(|| {
            log_error("❌ [Resources] Error fetching opportunities: token sem locationId");
            AppError::MissingLocation
        })?;

        let options = RequestOptions::default().with_param("location_id", location_id);
        self.fetch("opportunities", "/opportunities/search", options, token).await
    }

    pub async fn fetch_users(&self, token: &TokenRecord) -> AppResult<Value> {
        self.fetch("users", "/users/", RequestOptions::default(), token).await
    }

    pub async fn fetch_calendars(&self, token: &TokenRecord) -> AppResult<Value> {
        self.fetch("calendars", "/calendars/", RequestOptions::default(), token).await
    }

    pub async fn fetch_associations(&self, token: &TokenRecord) -> AppResult<Value> {
        self.fetch("associations", "/associations/", RequestOptions::default(), token).await
    }

    async fn fetch(
        &self,
        resource: &str,
        endpoint: &str,
        options: RequestOptions,
        token: &TokenRecord,
    ) -> AppResult<Value> {
        self.api
            .make_authenticated_request(endpoint, options, Some(token))
            .await
            .map_err(|e| {
                log_error(&format!("❌ [Resources] Error fetching {}: {}", resource, e));
                e
            })
    }
}
