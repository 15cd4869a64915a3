//! HTTP handlers.

pub mod export;
pub mod properties;
pub mod system;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Error shape returned to clients. Everything unexpected collapses to a
/// generic 500; upstream partial failures never surface here.
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, detail: detail.into() }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, detail: detail.into() }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, detail: detail.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<propscout_common::ScoutError>,
{
    fn from(e: E) -> Self {
        let e: propscout_common::ScoutError = e.into();
        ApiError::internal(e.to_string())
    }
}
