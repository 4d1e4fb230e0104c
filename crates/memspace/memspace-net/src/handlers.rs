use crate::wire::{from_wire, to_wire, WireField};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct ApiError {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

#[derive(Deserialize)]
pub struct PutRequest {
    pub tuple: Vec<WireField>,
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub template: Vec<WireField>,
}

#[derive(Serialize)]
pub struct TupleResponse {
    pub tuple: Option<Vec<WireField>>,
}

/// `POST /v1/tuples` — §4.4 `put`.
pub async fn put(State(state): State<Arc<AppState>>, Json(body): Json<PutRequest>) -> impl IntoResponse {
    let tuple = from_wire(body.tuple);
    state.store.put(tuple);
    StatusCode::CREATED
}

/// `POST /v1/tuples/get` — §4.5 destructive `get`.
pub async fn get(State(state): State<Arc<AppState>>, Json(body): Json<QueryRequest>) -> Json<TupleResponse> {
    let template = from_wire(body.template);
    let found = state.store.get(&template);
    Json(TupleResponse { tuple: found.as_deref().map(to_wire) })
}

/// `POST /v1/tuples/read` — §4.6 non-destructive `read`.
pub async fn read(State(state): State<Arc<AppState>>, Json(body): Json<QueryRequest>) -> Json<TupleResponse> {
    let template = from_wire(body.template);
    let found = state.store.read(&template);
    Json(TupleResponse { tuple: found.as_deref().map(to_wire) })
}

/// `GET /v1/health`
pub async fn health() -> StatusCode {
    StatusCode::OK
}
