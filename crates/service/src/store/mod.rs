//! Document store contract.
//!
//! A store keeps schema-free JSON objects grouped by collection and assigns
//! each a unique opaque id on insert. Single-document writes are atomic;
//! nothing spans documents.

pub mod json_file;
pub mod seaorm;

use std::sync::Arc;

use async_trait::async_trait;
use configs::{StoreConfig, SUPPORTED_STORE_SCHEMES};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::errors::ServiceError;

pub use json_file::JsonFileStore;
pub use seaorm::SeaOrmDocumentStore;

/// A document as the store sees it: id plus the untyped body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub body: Map<String, Value>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn kind(&self) -> &'static str;
    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<StoredDocument, ServiceError>;
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, ServiceError>;
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, ServiceError>;
    /// Overwrite the whole body; `Ok(false)` when the id is absent.
    async fn replace(&self, collection: &str, id: &str, body: Map<String, Value>) -> Result<bool, ServiceError>;
    /// `Ok(false)` when the id is absent.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, ServiceError>;
    async fn ping(&self) -> Result<(), ServiceError>;
    async fn close(&self) -> Result<(), ServiceError> { Ok(()) }
}

/// Backend selected by the connection string scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Postgres(String),
    File(String),
    Memory,
}

impl StoreLocation {
    pub fn parse(url: &str) -> Result<Self, ServiceError> {
        let url = url.trim();
        let lower = url.to_ascii_lowercase();
        let unsupported = || ServiceError::Store(format!("unsupported store url scheme: {url}"));
        let scheme = SUPPORTED_STORE_SCHEMES
            .iter()
            .copied()
            .find(|s| lower.starts_with(s))
            .ok_or_else(unsupported)?;
        let rest = &url[scheme.len()..];
        match scheme {
            "postgres://" | "postgresql://" => Ok(Self::Postgres(url.to_string())),
            "file://" if rest.is_empty() => Err(ServiceError::Store("file:// store url needs a path".into())),
            "file://" => Ok(Self::File(rest.to_string())),
            "memory://" => Ok(Self::Memory),
            _ => Err(unsupported()),
        }
    }
}

/// Open the process-wide store handle described by `cfg`.
pub async fn connect(cfg: &StoreConfig) -> Result<Arc<dyn DocumentStore>, ServiceError> {
    let store: Arc<dyn DocumentStore> = match StoreLocation::parse(&cfg.url)? {
        StoreLocation::Postgres(_) => SeaOrmDocumentStore::connect(cfg).await?,
        StoreLocation::File(path) => JsonFileStore::open(path).await?,
        StoreLocation::Memory => JsonFileStore::in_memory(),
    };
    info!(store = store.kind(), "document store ready");
    Ok(store)
}
