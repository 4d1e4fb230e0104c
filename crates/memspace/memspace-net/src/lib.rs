//! The network façade (§4.8): a trivial in-memory tuple store exposed over
//! HTTP/JSON, for remote or same-host clients that don't want to link
//! against `memspace-core` and attach to the shared-memory region directly.

mod handlers;
mod routes;
mod store;
mod wire;

use std::sync::Arc;

pub use store::TupleStore;
pub use wire::WireField;

pub struct AppState {
    pub store: TupleStore,
}

impl AppState {
    pub fn new() -> Self {
        Self { store: TupleStore::new() }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the façade's router over a fresh, empty in-memory store.
pub fn router() -> axum::Router {
    routes::build_router(Arc::new(AppState::new()))
}
