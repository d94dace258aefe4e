//! Service layer: the generic resource CRUD rules on top of a pluggable
//! document store.
//! - `store` defines the store contract and its Postgres / JSON-file backends.
//! - `resource` turns raw request bodies into validated records and maps
//!   store outcomes to `ServiceError`.

pub mod errors;
pub mod store;
pub mod resource;

pub use resource::ResourceService;
pub use store::{DocumentStore, StoredDocument};
