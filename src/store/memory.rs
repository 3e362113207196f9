use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::TokenStore;
use crate::models::TokenRecord;
use crate::utils::AppResult;

/// Store em memória com a mesma semântica do MongoDB
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    records: RwLock<HashMap<ObjectId, TokenRecord>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn find_by_access_token(&self, access_token: &str) -> AppResult<Option<TokenRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.access_token == access_token)
            .cloned())
    }

    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<TokenRecord>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|r| r.user_id.as_deref() == Some(user_id))
            .cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<TokenRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &TokenRecord) -> AppResult<()> {
        self.records.write().await.insert(record.id, record.clone());
        Ok(())
    }
}
