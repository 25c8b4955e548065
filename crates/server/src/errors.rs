use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Body returned for any rejected `/setinfo` payload.
pub const INVALID_DATA: &str = "Invalid data";

/// Handler failures. Details go to the log; clients only see a fixed body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_client_error() {
            warn!(error = %e, "request rejected");
            Self::InvalidData(e.to_string())
        } else {
            error!(error = %e, "request failed");
            Self::Internal(e.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::InvalidData(_) => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                INVALID_DATA,
            )
                .into_response(),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "internal server error"})),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let resp = ApiError::from(ServiceError::Validation("tags not set".into())).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn storage_failures_are_internal() {
        for e in [ServiceError::Encoding("abc".into()), ServiceError::Db("gone".into())] {
            let resp = ApiError::from(e).into_response();
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
