use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::state::ServerState;

// 302 rather than axum's `Redirect::to`, which answers 303.
fn found(location: &str) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())])
}

pub async fn doc(State(state): State<ServerState>) -> impl IntoResponse {
    found(&state.links.doc)
}

pub async fn release_notes(State(state): State<ServerState>) -> impl IntoResponse {
    found(&state.links.release_notes)
}

pub async fn source(State(state): State<ServerState>) -> impl IntoResponse {
    found(&state.links.source)
}

pub async fn licence(State(state): State<ServerState>) -> impl IntoResponse {
    found(&state.links.licence)
}

pub async fn provenance(State(state): State<ServerState>) -> impl IntoResponse {
    found(&state.links.provenance)
}
