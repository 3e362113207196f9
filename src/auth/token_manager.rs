//! Token Manager
//!
//! Ciclo de vida dos tokens OAuth2: exchange do authorization code, refresh e
//! resolução de um token válido para cada requisição (refresh-on-read).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bson::oid::ObjectId;
use chrono::Utc;

use super::config::{OAuth2Config, TOKEN_ENDPOINT};
use crate::models::{TokenRecord, TokenResponse};
use crate::services::GhlApiClient;
use crate::store::TokenStore;
use crate::utils::logging::*;
use crate::utils::{mask_credential, AppError, AppResult};

type RecordLock = Arc<tokio::sync::Mutex<()>>;

/// Um mutex por registro: refreshes do mesmo token são serializados
#[derive(Debug, Default)]
struct RefreshLocks {
    locks: Mutex<HashMap<ObjectId, RecordLock>>,
}

impl RefreshLocks {
    fn slot(&self, id: &ObjectId) -> RefreshSlot<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        RefreshSlot {
            owner: self,
            id: *id,
            lock: locks.entry(*id).or_default().clone(),
        }
    }

    /// Remove a entrada quando só restam o mapa e o handle que está saindo
    fn release(&self, id: &ObjectId, lock: &RecordLock) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if Arc::strong_count(lock) <= 2 {
            locks.remove(id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Handle do lock de um registro; libera a entrada do mapa no drop
struct RefreshSlot<'a> {
    owner: &'a RefreshLocks,
    id: ObjectId,
    lock: RecordLock,
}

impl Drop for RefreshSlot<'_> {
    fn drop(&mut self) {
        self.owner.release(&self.id, &self.lock);
    }
}

/// Gerenciador de tokens OAuth2
pub struct TokenManager {
    config: OAuth2Config,
    api: Arc<GhlApiClient>,
    store: Arc<dyn TokenStore>,
    refresh_locks: RefreshLocks,
}

impl TokenManager {
    pub fn new(config: OAuth2Config, api: Arc<GhlApiClient>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            config,
            api,
            store,
            refresh_locks: RefreshLocks::default(),
        }
    }

    /// URL para onde o usuário é redirecionado em `/auth/authorize`
    pub fn authorization_url(&self) -> String {
        self.config.authorization_url()
    }

    /// Trocar authorization code por access/refresh token
    ///
    /// Se já existe registro para o `userId` retornado, ele é atualizado
    /// (mesma identidade); caso contrário um novo é criado.
    ///
    /// # Retorno
    /// - `Ok(TokenRecord)`: registro persistido
    /// - `Err(AppError::UpstreamAuth)`: falha ou resposta malformada do provedor
    pub async fn exchange_code_for_token(&self, code: &str) -> AppResult<TokenRecord> {
        log_info(&format!("🔐 [TokenManager] Trocando authorization code: {}", mask_credential(code)));

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response: TokenResponse = self
            .api
            .make_token_request(TOKEN_ENDPOINT, &form)
            .await
            .map_err(|e| AppError::upstream_auth(e.log_detail()))?;
        let received_at = Utc::now();

        let refresh_token = response
            .new_refresh_token()
            .ok_or_else(|| AppError::upstream_auth("token response without refresh_token"))?
            .to_string();

        let existing = match response.user_id.as_deref() {
            Some(user_id) => self.store.find_by_user_id(user_id).await?,
            None => None,
        };

        let record = match existing {
            Some(current) => {
                log_info("🔄 [TokenManager] Registro existente para o usuário, atualizando");
                current.apply_exchange(&response, &refresh_token, received_at)?
            }
            None => TokenRecord::new_from_exchange(&response, &refresh_token, received_at)?,
        };

        self.store.save(&record).await?;
        log_token_persisted(&record.id.to_hex(), record.user_id.as_deref());

        Ok(record)
    }

    /// Renovar o access token usando o refresh token armazenado
    ///
    /// O refresh token só é substituído se o provedor enviar um novo.
    pub async fn refresh_access_token(&self, token: Option<&TokenRecord>) -> AppResult<TokenRecord> {
        let token = token.ok_or_else(|| {
            log_error("❌ [TokenManager] Refresh solicitado sem token");
            AppError::InvalidToken
        })?;

        let slot = self.refresh_locks.slot(&token.id);
        let _guard = slot.lock.lock().await;

        // Sempre parte do estado persistido mais recente
        let current = self
            .store
            .find_by_id(&token.id)
            .await?
            .unwrap_or_else(|| token.clone());

        self.refresh_unlocked(&current).await
    }

    /// Resolver um access token em um registro válido
    ///
    /// Se o token expira em até 5 minutos, ele é renovado antes de retornar.
    /// Refreshes concorrentes do mesmo registro são serializados: quem espera
    /// reaproveita o resultado de quem renovou primeiro.
    pub async fn get_valid_token(&self, access_token: &str) -> AppResult<TokenRecord> {
        let record = self
            .store
            .find_by_access_token(access_token)
            .await?
            .ok_or_else(|| {
                log_warning(&format!("⚠️ [TokenManager] Token desconhecido: {}", mask_credential(access_token)));
                AppError::InvalidToken
            })?;

        if !record.needs_refresh(Utc::now()) {
            return Ok(record);
        }

        log_info(&format!(
            "⏰ [TokenManager] Token {} expira em {}, renovando...",
            record.id.to_hex(),
            record.expires_at.to_rfc3339()
        ));

        let slot = self.refresh_locks.slot(&record.id);
        let _guard = slot.lock.lock().await;

        let current = self
            .store
            .find_by_id(&record.id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if current.access_token != record.access_token && !current.needs_refresh(Utc::now()) {
            log_info("♻️ [TokenManager] Refresh concorrente já concluído, reutilizando token");
            return Ok(current);
        }

        self.refresh_unlocked(&current).await
    }

    /// Chamada ao provedor + persistência. Exige o lock do registro.
    async fn refresh_unlocked(&self, current: &TokenRecord) -> AppResult<TokenRecord> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", current.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response: TokenResponse = self
            .api
            .make_token_request(TOKEN_ENDPOINT, &form)
            .await
            .map_err(|e| {
                log_error(&format!("❌ [TokenManager] Error refreshing access token: {}", e.log_detail()));
                AppError::upstream_auth(e.log_detail())
            })?;

        let refreshed = current.apply_refresh(&response, Utc::now()).map_err(|e| {
            log_error(&format!("❌ [TokenManager] Error refreshing access token: {}", e.log_detail()));
            e
        })?;
        self.store.save(&refreshed).await?;

        log_info(&format!(
            "✅ [TokenManager] Token {} renovado, expira em {}",
            refreshed.id.to_hex(),
            refreshed.expires_at.to_rfc3339()
        ));

        Ok(refreshed)
    }
}
