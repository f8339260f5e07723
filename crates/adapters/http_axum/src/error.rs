//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use purahub_domain::error::PuraError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`PuraError`] to an HTTP response with appropriate status code.
pub struct ApiError(PuraError);

impl From<PuraError> for ApiError {
    fn from(err: PuraError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PuraError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            PuraError::TargetNotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            PuraError::DeviceCommand(err) => {
                tracing::error!(error = %err, "device command failed");
                (StatusCode::BAD_GATEWAY, format!("device command failed: {err}"))
            }
            PuraError::Decode(err) => {
                tracing::error!(error = %err, "malformed device record");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
