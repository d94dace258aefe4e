//! Uniform CRUD handlers, instantiated once per resource type.
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use common::types::MessageBody;
use models::{Record, Resource};
use serde_json::Value;
use service::errors::ServiceError;
use tracing::{error, warn};

use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
enum Action {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl Action {
    fn failure_message<T: Resource>(self) -> String {
        match self {
            Action::Create => format!("Error creating {}", T::noun()),
            Action::List => format!("Error fetching {}", T::COLLECTION),
            Action::Get => format!("Error fetching {}", T::noun()),
            Action::Update => format!("Error updating {}", T::noun()),
            Action::Delete => format!("Error deleting {}", T::noun()),
        }
    }
}

/// Validation → 400 with field detail, not found → 404, store failure → 500
/// with the generic message only (the cause goes to the log).
fn api_error<T: Resource>(action: Action, err: ServiceError) -> JsonApiError {
    match err {
        ServiceError::Validation(fields) => {
            warn!(collection = T::COLLECTION, ?action, error = %fields, "rejected invalid input");
            JsonApiError::new(StatusCode::BAD_REQUEST, action.failure_message::<T>(), Some(fields.to_string()))
                .with_fields(fields)
        }
        ServiceError::NotFound(msg) => {
            warn!(collection = T::COLLECTION, ?action, "{}", msg);
            JsonApiError::new(StatusCode::NOT_FOUND, msg, None)
        }
        ServiceError::Store(cause) => {
            error!(collection = T::COLLECTION, ?action, error = %cause, "store operation failed");
            JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, action.failure_message::<T>(), None)
        }
    }
}

/// Unreadable bodies are client errors. A missing `content-type` counts as an
/// empty body, so it is a 400 like the rest rather than axum's 415.
fn body_error<T: Resource>(action: Action, rejection: JsonRejection) -> JsonApiError {
    warn!(collection = T::COLLECTION, ?action, error = %rejection.body_text(), "unreadable request body");
    let status = match &rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    };
    JsonApiError::new(status, action.failure_message::<T>(), Some(rejection.body_text()))
}

pub async fn create<T: Resource>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Record<T>>), JsonApiError> {
    let Json(body) = body.map_err(|r| body_error::<T>(Action::Create, r))?;
    let record = state
        .resource::<T>()
        .create(body)
        .await
        .map_err(|e| api_error::<T>(Action::Create, e))?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list<T: Resource>(State(state): State<AppState>) -> Result<Json<Vec<Record<T>>>, JsonApiError> {
    state
        .resource::<T>()
        .list()
        .await
        .map(Json)
        .map_err(|e| api_error::<T>(Action::List, e))
}

pub async fn get_one<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record<T>>, JsonApiError> {
    state
        .resource::<T>()
        .get(&id)
        .await
        .map(Json)
        .map_err(|e| api_error::<T>(Action::Get, e))
}

pub async fn update<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Record<T>>, JsonApiError> {
    let Json(body) = body.map_err(|r| body_error::<T>(Action::Update, r))?;
    state
        .resource::<T>()
        .update(&id, body)
        .await
        .map(Json)
        .map_err(|e| api_error::<T>(Action::Update, e))
}

pub async fn remove<T: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, JsonApiError> {
    state
        .resource::<T>()
        .delete(&id)
        .await
        .map_err(|e| api_error::<T>(Action::Delete, e))?;
    Ok(Json(MessageBody::new(format!("{} deleted successfully", T::LABEL))))
}

/// `/{collection}` and `/{collection}/:id` for one resource type.
pub fn resource_router<T: Resource>() -> Router<AppState> {
    let collection = format!("/{}", T::COLLECTION);
    let item = format!("/{}/:id", T::COLLECTION);
    Router::new()
        .route(&collection, get(list::<T>).post(create::<T>))
        .route(&item, get(get_one::<T>).put(update::<T>).delete(remove::<T>))
}
