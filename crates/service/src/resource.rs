use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use models::errors::FieldErrors;
use models::resource::{to_fields, Record, Resource, IDENTITY_KEYS};
use models::validation::{strip_keys, Fields};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;
use crate::store::{DocumentStore, StoredDocument};

/// CRUD rules for one resource type over a shared document store.
///
/// Every write validates the complete record before touching the store, so a
/// rejected request never leaves a partial write behind.
pub struct ResourceService<T: Resource> {
    store: Arc<dyn DocumentStore>,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> Clone for ResourceService<T> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), _resource: PhantomData }
    }
}

fn into_object(body: Value) -> Result<Fields, ServiceError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(ServiceError::Validation(FieldErrors::single("body", "must be a JSON object"))),
    }
}

impl<T: Resource> ResourceService<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _resource: PhantomData }
    }

    /// A stored body that fails the current rules is a store fault, not a
    /// client error.
    fn decode(doc: StoredDocument) -> Result<Record<T>, ServiceError> {
        let id = doc.id.clone();
        Record::from_stored(doc.id, doc.body)
            .map_err(|e| ServiceError::Store(format!("stored {} {id} is unreadable: {e}", T::noun())))
    }

    #[instrument(skip_all, fields(collection = T::COLLECTION))]
    pub async fn create(&self, body: Value) -> Result<Record<T>, ServiceError> {
        let mut fields = into_object(body)?;
        strip_keys(&mut fields, &IDENTITY_KEYS);
        strip_keys(&mut fields, T::READ_ONLY);

        let mut data = T::validate(fields)?;
        data.on_create(Utc::now());

        let doc = self.store.insert(T::COLLECTION, to_fields(&data)?).await?;
        info!(id = %doc.id, "{} created", T::noun());
        Ok(Record { id: doc.id, data })
    }

    /// All records in store order. Stored bodies that no longer validate are
    /// skipped with a warning rather than failing the whole listing.
    pub async fn list(&self) -> Result<Vec<Record<T>>, ServiceError> {
        let docs = self.store.find_all(T::COLLECTION).await?;
        let mut records = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = doc.id.clone();
            match Self::decode(doc) {
                Ok(record) => records.push(record),
                Err(e) => warn!(%id, collection = T::COLLECTION, error = %e, "skipping unreadable document"),
            }
        }
        Ok(records)
    }

    pub async fn get(&self, id: &str) -> Result<Record<T>, ServiceError> {
        match self.store.find_by_id(T::COLLECTION, id).await? {
            Some(doc) => Self::decode(doc),
            None => Err(ServiceError::not_found(T::LABEL)),
        }
    }

    /// Merge `body` over the stored record, re-validate the result, and
    /// replace the stored document with it.
    ///
    /// Keys present in `body` win, including explicit `null`s; absent keys keep
    /// their stored values. `id` may be repeated but not changed.
    #[instrument(skip(self, body), fields(collection = T::COLLECTION))]
    pub async fn update(&self, id: &str, body: Value) -> Result<Record<T>, ServiceError> {
        let current = self
            .store
            .find_by_id(T::COLLECTION, id)
            .await?
            .ok_or_else(|| ServiceError::not_found(T::LABEL))?;
        let mut merged = current.body.clone();
        Self::decode(current)?;

        let mut patch = into_object(body)?;
        if let Some(given) = patch.get("id") {
            if given.as_str() != Some(id) {
                return Err(ServiceError::Validation(FieldErrors::single("id", "is immutable")));
            }
        }
        strip_keys(&mut patch, &IDENTITY_KEYS);
        strip_keys(&mut patch, T::READ_ONLY);

        merged.extend(patch);

        let mut data = T::validate(merged)?;
        data.on_update(Utc::now());

        // The record can vanish between the read and the write.
        if !self.store.replace(T::COLLECTION, id, to_fields(&data)?).await? {
            return Err(ServiceError::not_found(T::LABEL));
        }
        info!(%id, "{} updated", T::noun());
        Ok(Record { id: id.to_string(), data })
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if self.store.delete(T::COLLECTION, id).await? {
            info!(%id, collection = T::COLLECTION, "{} deleted", T::noun());
            Ok(())
        } else {
            Err(ServiceError::not_found(T::LABEL))
        }
    }
}
