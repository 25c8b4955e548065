//! Research middleware API: service info and usage statistics.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Json,
};
use models::{info::InfoResponse, statistic::StatisticResponse};

use crate::errors::ApiError;
use crate::routes::wants_json;
use crate::state::ServerState;
use crate::views;

/// Current service description, as JSON or HTML depending on `Accept`.
#[utoipa::path(get, path = "/info", tag = "service", responses(
    (status = 200, description = "Current info record", body = crate::openapi::InfoDoc),
    (status = 500, description = "Storage failure")
))]
pub async fn info(State(state): State<ServerState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let current = state.info.get_or_seed().await?;
    let body = InfoResponse::from(&current);
    if wants_json(&headers) {
        return Ok(Json(body).into_response());
    }
    Ok(Html(views::info_page(&body)).into_response())
}

/// Invocation counter of the demo application, as JSON or HTML.
#[utoipa::path(get, path = "/stats", tag = "service", responses(
    (status = 200, description = "Current counter", body = crate::openapi::StatisticDoc),
    (status = 500, description = "Storage failure")
))]
pub async fn stats(State(state): State<ServerState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let name = state.counter.invocations_name().to_string();
    let current = state.counter.get_or_seed(&name).await?;
    let body = StatisticResponse::from(&current);
    if wants_json(&headers) {
        return Ok(Json(body).into_response());
    }
    Ok(Html(views::stats_page(&body)).into_response())
}

#[utoipa::path(put, path = "/add", tag = "counter", responses(
    (status = 200, description = "Counter after increment", body = crate::openapi::StatisticDoc),
    (status = 500, description = "Stored value is corrupt or storage failed")
))]
pub async fn add(State(state): State<ServerState>) -> Result<Json<StatisticResponse>, ApiError> {
    let name = state.counter.invocations_name().to_string();
    let saved = state.counter.increment(&name).await?;
    state.metrics.counter_increments.inc();
    Ok(Json(StatisticResponse::from(&saved)))
}

#[utoipa::path(put, path = "/reset", tag = "counter", responses(
    (status = 200, description = "Counter after reset", body = crate::openapi::StatisticDoc),
    (status = 500, description = "Storage failure")
))]
pub async fn reset(State(state): State<ServerState>) -> Result<Json<StatisticResponse>, ApiError> {
    let name = state.counter.invocations_name().to_string();
    let saved = state.counter.reset(&name).await?;
    state.metrics.counter_resets.inc();
    Ok(Json(StatisticResponse::from(&saved)))
}

/// Replace the service description. The body is read raw so that malformed
/// JSON gets the same `Invalid data` answer as a failed field check.
#[utoipa::path(put, path = "/setinfo", tag = "service",
    request_body = crate::openapi::InfoDoc,
    responses(
        (status = 200, description = "Stored info record", body = crate::openapi::InfoDoc),
        (status = 400, description = "Invalid data", body = String, content_type = "text/plain"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn set_info(State(state): State<ServerState>, body: Bytes) -> Result<Json<InfoResponse>, ApiError> {
    let saved = state.info.set_info_from_json(&body).await.map_err(|e| {
        if e.is_client_error() {
            state.metrics.info_rejected.inc();
        }
        ApiError::from(e)
    })?;
    state.metrics.info_updates.inc();
    Ok(Json(InfoResponse::from(&saved)))
}
