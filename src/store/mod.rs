//! # Token Store
//!
//! Persistência dos registros de token. A concorrência fica a cargo da
//! camada de persistência: cada `save` é uma escrita atômica de um único registro.
//!
//! ## Implementações:
//! - `mongo.rs`: coleção MongoDB (produção)
//! - `memory.rs`: HashMap em memória (testes e desenvolvimento local)

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::models::TokenRecord;
use crate::utils::AppResult;

pub mod memory;
pub mod mongo;

pub use memory::InMemoryTokenStore;
pub use mongo::MongoTokenStore;

#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Busca pelo access token (no máximo um registro)
    async fn find_by_access_token(&self, access_token: &str) -> AppResult<Option<TokenRecord>>;

    /// Busca o registro canônico de um usuário
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<TokenRecord>>;

    async fn find_by_id(&self, id: &ObjectId) -> AppResult<Option<TokenRecord>>;

    /// Insere ou substitui o registro inteiro (upsert por `_id`)
    async fn save(&self, record: &TokenRecord) -> AppResult<()>;
}
