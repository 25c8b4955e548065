use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use once_cell::sync::Lazy;
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod api;
pub mod app;
pub mod docs;

/// Media type that selects JSON over HTML. Only an exact `Accept` match counts.
pub const JSON_CONTENT: &str = "application/json";

pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == JSON_CONTENT)
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics(State(state): State<ServerState>) -> impl IntoResponse {
    state.metrics.encode()
}

static OPENAPI: Lazy<utoipa::openapi::OpenApi> = Lazy::new(ApiDoc::openapi);

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(OPENAPI.clone())
}

/// Full application router: service API, documentation redirects, demo app and ops endpoints.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let service_api = Router::new()
        .route("/info", get(api::info))
        .route("/stats", get(api::stats))
        .route("/add", put(api::add))
        .route("/reset", put(api::reset))
        .route("/setinfo", put(api::set_info));

    let documentation = Router::new()
        .route("/doc", get(docs::doc))
        .route("/releasenotes", get(docs::release_notes))
        .route("/source", get(docs::source))
        .route("/licence", get(docs::licence))
        .route("/provenance", get(docs::provenance))
        .route("/support", get(app::support));

    let demo = Router::new()
        .route("/app", get(app::app))
        .route("/tryme", get(app::app))
        .route("/update", post(app::update));

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    service_api
        .merge(documentation)
        .merge(demo)
        .merge(ops)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn json_only_on_exact_accept() {
        let mut h = HeaderMap::new();
        assert!(!wants_json(&h));
        h.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        assert!(wants_json(&h));
        h.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/html"));
        assert!(!wants_json(&h));
        h.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        assert!(!wants_json(&h));
    }
}
