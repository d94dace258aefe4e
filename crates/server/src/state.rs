use std::sync::Arc;

use models::Resource;
use service::{DocumentStore, ResourceService};

/// Shared by every handler: the process-wide store handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub service_name: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, service_name: &str) -> Self {
        Self { store, service_name: Arc::from(service_name) }
    }

    pub fn resource<T: Resource>(&self) -> ResourceService<T> {
        ResourceService::new(Arc::clone(&self.store))
    }
}
