pub mod resources;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use common::types::Health;
use models::{Booking, Task};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::state::AppState;

/// 200 when the store answers a ping, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health::healthy(&state.service_name))),
        Err(e) => {
            warn!(error = %e, store = state.store.kind(), "health check: store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health::degraded(&state.service_name)))
        }
    }
}

/// Build the full application router: health plus every resource, the latter
/// nested under `api_prefix` when one is configured.
pub fn build_router(state: AppState, cors: CorsLayer, api_prefix: &str) -> Router {
    let api = Router::new()
        .merge(resources::resource_router::<Task>())
        .merge(resources::resource_router::<Booking>());
    let api = if api_prefix.is_empty() { api } else { Router::new().nest(api_prefix, api) };

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx responses are logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
