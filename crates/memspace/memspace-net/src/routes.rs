use crate::handlers;
use crate::AppState;
use axum::{routing::{get, post}, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/tuples", post(handlers::put))
        .route("/v1/tuples/get", post(handlers::get))
        .route("/v1/tuples/read", post(handlers::read))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
