use std::sync::Arc;

use async_trait::async_trait;
use configs::StoreConfig;
use migration::MigratorTrait;
use models::document;
use sea_orm::DatabaseConnection;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::store::{DocumentStore, StoredDocument};

/// Postgres-backed store: every collection shares the `document` table.
pub struct SeaOrmDocumentStore {
    pub db: DatabaseConnection,
}

impl SeaOrmDocumentStore {
    /// Connect with the configured pool and bring the schema up to date.
    pub async fn connect(cfg: &StoreConfig) -> Result<Arc<Self>, ServiceError> {
        let db = models::db::connect_with_config(cfg).await.map_err(ServiceError::store)?;
        migration::Migrator::up(&db, None).await.map_err(ServiceError::store)?;
        info!("document schema migrated");
        Ok(Arc::new(Self { db }))
    }
}

fn into_stored(model: document::Model) -> StoredDocument {
    let body = match model.body {
        Value::Object(map) => map,
        other => {
            warn!(id = %model.id, collection = %model.collection, kind = ?other, "document body is not an object");
            Map::new()
        }
    };
    StoredDocument { id: model.id, body }
}

#[async_trait]
impl DocumentStore for SeaOrmDocumentStore {
    fn kind(&self) -> &'static str { "postgres" }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<StoredDocument, ServiceError> {
        let model = document::insert(&self.db, collection, Value::Object(body)).await?;
        Ok(into_stored(model))
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, ServiceError> {
        let rows = document::list(&self.db, collection).await?;
        Ok(rows.into_iter().map(into_stored).collect())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, ServiceError> {
        Ok(document::find(&self.db, collection, id).await?.map(into_stored))
    }

    async fn replace(&self, collection: &str, id: &str, body: Map<String, Value>) -> Result<bool, ServiceError> {
        Ok(document::replace(&self.db, collection, id, Value::Object(body)).await?)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, ServiceError> {
        Ok(document::delete(&self.db, collection, id).await?)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.db.ping().await.map_err(ServiceError::store)
    }

    async fn close(&self) -> Result<(), ServiceError> {
        // Clones share one pool, closing any of them closes it.
        self.db.clone().close().await.map_err(ServiceError::store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn seaorm_store_crud() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let Ok(url) = std::env::var("DATABASE_URL") else { return Ok(()) };
        let cfg = StoreConfig { url, ..StoreConfig::default() };
        let store = match SeaOrmDocumentStore::connect(&cfg).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };

        let collection = format!("svc_{}", uuid::Uuid::new_v4().simple());
        let body = json!({"title": "pg"}).as_object().cloned().unwrap_or_default();
        let doc = store.insert(&collection, body).await?;
        assert_eq!(store.find_all(&collection).await?.len(), 1);
        assert!(store.find_by_id(&collection, &doc.id).await?.is_some());
        assert!(store.delete(&collection, &doc.id).await?);
        assert!(store.find_by_id(&collection, &doc.id).await?.is_none());
        store.ping().await?;
        Ok(())
    }
}
