//! Demo counter application and the static support page.

use std::collections::HashMap;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    Form,
};
use models::statistic::StatisticResponse;
use tracing::debug;

use crate::errors::ApiError;
use crate::state::ServerState;
use crate::views;

pub async fn app(State(state): State<ServerState>) -> Result<Html<String>, ApiError> {
    let name = state.counter.invocations_name().to_string();
    let current = state.counter.get_or_seed(&name).await?;
    Ok(Html(views::app_page(&StatisticResponse::from(&current))))
}

/// Form submit from the app page. `add` wins when both keys are present;
/// neither key, or a body that is not a form, leaves the counter alone.
/// Always redirects back to `/app`.
pub async fn update(
    State(state): State<ServerState>,
    form: Option<Form<HashMap<String, String>>>,
) -> Result<impl IntoResponse, ApiError> {
    let form = form.map(|Form(fields)| fields).unwrap_or_default();
    let name = state.counter.invocations_name().to_string();
    if form.contains_key("add") {
        state.counter.increment(&name).await?;
        state.metrics.counter_increments.inc();
    } else if form.contains_key("reset") {
        state.counter.reset(&name).await?;
        state.metrics.counter_resets.inc();
    } else {
        debug!("update form without add or reset");
    }
    Ok((StatusCode::FOUND, [(header::LOCATION, "/app")]))
}

pub async fn support(State(state): State<ServerState>) -> Result<Html<String>, ApiError> {
    let current = state.info.get_or_seed().await?;
    Ok(Html(views::support_page(&current.support_email)))
}
