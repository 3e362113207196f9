use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

use super::TokenStore;
use crate::models::TokenRecord;
use crate::utils::logging::*;
use crate::utils::AppResult;

/// Store MongoDB (coleção `tokens`)
#[derive(Debug, Clone)]
pub struct MongoTokenStore {
    collection: Collection<TokenRecord>,
}

impl MongoTokenStore {
    /// Conecta ao MongoDB e seleciona banco/coleção
    pub async fn connect(uri: &str, database: &str, collection: &str) -> AppResult<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);

        log_info(&format!("🍃 [TokenStore] MongoDB conectado: {}/{}", database, collection));

        Ok(Self::from_database(&db, collection))
    }

    pub fn from_database(db: &Database, collection: &str) -> Self {
        Self {
            collection: db.collection(collection),
        }
    }

    /// Índices únicos por access token e por usuário (sparse: userId é opcional)
    pub async fn ensure_indexes(&self) -> AppResult<()> {
        let by_access_token = IndexModel::builder()
            .keys(doc! { "accessToken": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let by_user = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(IndexOptions::builder().unique(true).sparse(true).build())
            .build();

        self.collection.create_indexes(vec![by_access_token, by_user]).await?;

        log_info("✅ [TokenStore] Índices garantidos: accessToken, userId");
        Ok(())
    }
}

#[async_trait]
impl TokenStore for MongoTokenStore {
    async fn find_by_access_token(&self, access_token: &str) -> AppResult<Option<TokenRecord>> {
        Ok(self.collection.find_one(doc! { "accessToken": access_token }).await?)
    }

    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<TokenRecord>> {
        Ok(self.collection.find_one(doc! { "userId": user_id }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<TokenRecord>> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn save(&self, record: &TokenRecord) -> AppResult<()> {
        self.collection
            .replace_one(doc! { "_id": record.id }, record)
            .upsert(true)
            .await?;
        Ok(())
    }
}
