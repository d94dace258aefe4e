use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub store: String,
}

impl Health {
    pub fn healthy(service: &str) -> Self {
        Self { status: "healthy".into(), service: service.into(), store: "ok".into() }
    }

    pub fn degraded(service: &str) -> Self {
        Self { status: "degraded".into(), service: service.into(), store: "unavailable".into() }
    }
}

/// Plain confirmation body, e.g. `{"message": "Task deleted successfully"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
