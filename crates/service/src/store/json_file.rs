use std::{collections::HashMap, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{fs, sync::RwLock};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::store::{DocumentStore, StoredDocument};

type Collections = HashMap<String, Vec<StoredDocument>>;

/// Document store kept in memory and, when opened from a path, mirrored to a
/// JSON file after every write.
///
/// Intended for local development and tests where running Postgres is overkill.
/// Writes are serialized by the lock; a failed file write leaves memory untouched.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<RwLock<Collections>>,
    file_path: Option<PathBuf>,
}

impl JsonFileStore {
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(HashMap::new())), file_path: None })
    }

    /// Open the store at `path`. Creates the file with no collections if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::store)?;
        }

        let map: Collections = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Store(format!("{}: {e}", file_path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: Collections = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(ServiceError::store)?)
                    .await
                    .map_err(ServiceError::store)?;
                empty
            }
            Err(e) => return Err(ServiceError::store(e)),
        };

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path: Some(file_path) }))
    }

    /// Apply a mutation and persist it. The file is written to a sibling temp
    /// file and renamed into place before memory is updated.
    async fn mutate<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Collections) -> R,
    {
        let mut map = self.inner.write().await;
        let Some(path) = &self.file_path else {
            return Ok(f(&mut map));
        };
        let mut next = map.clone();
        let out = f(&mut next);
        let data = serde_json::to_vec_pretty(&next).map_err(ServiceError::store)?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data).await.map_err(ServiceError::store)?;
        fs::rename(&tmp, path).await.map_err(ServiceError::store)?;
        *map = next;
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn kind(&self) -> &'static str {
        if self.file_path.is_some() { "file" } else { "memory" }
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<StoredDocument, ServiceError> {
        let doc = StoredDocument { id: Uuid::new_v4().to_string(), body };
        let stored = doc.clone();
        self.mutate(move |map| map.entry(collection.to_string()).or_default().push(stored)).await?;
        Ok(doc)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredDocument>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(collection).cloned().unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(collection).and_then(|docs| docs.iter().find(|d| d.id == id)).cloned())
    }

    async fn replace(&self, collection: &str, id: &str, body: Map<String, Value>) -> Result<bool, ServiceError> {
        if self.find_by_id(collection, id).await?.is_none() {
            return Ok(false);
        }
        self.mutate(|map| {
            match map.get_mut(collection).and_then(|docs| docs.iter_mut().find(|d| d.id == id)) {
                Some(doc) => {
                    doc.body = body;
                    true
                }
                None => false,
            }
        })
        .await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, ServiceError> {
        if self.find_by_id(collection, id).await?.is_none() {
            return Ok(false);
        }
        self.mutate(|map| {
            let Some(docs) = map.get_mut(collection) else { return false };
            let before = docs.len();
            docs.retain(|d| d.id != id);
            docs.len() != before
        })
        .await
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        if let Some(path) = &self.file_path {
            fs::metadata(path).await.map_err(ServiceError::store)?;
        }
        Ok(())
    }
}
