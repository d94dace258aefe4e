use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;
use crate::validation::Fields;

/// Keys that identify a record in the store and are never taken from a request body.
pub const IDENTITY_KEYS: [&str; 2] = ["id", "_id"];

/// A record shape exposed through the uniform CRUD endpoints.
///
/// `validate` is the single gate between untyped input and a storable record:
/// it runs on the create body and again on the merged record of every update.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Store collection and URL segment, e.g. `tasks`.
    const COLLECTION: &'static str;
    /// Singular name used in response messages, e.g. `Task`.
    const LABEL: &'static str;
    /// Fields maintained by the service; client values are dropped.
    const READ_ONLY: &'static [&'static str] = &[];

    fn validate(fields: Fields) -> Result<Self, ModelError>;

    fn on_create(&mut self, _now: DateTime<Utc>) {}

    fn on_update(&mut self, _now: DateTime<Utc>) {}

    fn noun() -> String {
        Self::LABEL.to_lowercase()
    }
}

/// A persisted record: the store-assigned id plus the resource fields, flattened
/// into one JSON object on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    pub id: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Resource> Record<T> {
    /// Rebuild a typed record from a stored body, re-running validation.
    pub fn from_stored(id: String, body: Fields) -> Result<Self, ModelError> {
        Ok(Self { id, data: T::validate(body)? })
    }
}

/// Serialize resource fields into the object form the store persists.
pub fn to_fields<T: Serialize>(data: &T) -> Result<Fields, ModelError> {
    match serde_json::to_value(data).map_err(|e| ModelError::Db(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(ModelError::Db(format!("record serialized to non-object: {other}"))),
    }
}
