#[cfg(feature = "server")]
use crate::error::AppError;
#[cfg(feature = "server")]
use crate::models::story::MessageResponse;
#[cfg(feature = "server")]
use axum::http::StatusCode;
#[cfg(feature = "server")]
use axum::response::{IntoResponse, Response};

/// Converts an `AppError` into the `{message, success: false}` body.
///
/// Only "not found" and authentication failures get their own status;
/// everything else, including malformed input, is reported as a 500.
#[cfg(feature = "server")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Validation(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }

        let body = MessageResponse::failure(self.message());

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(feature = "server")]
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
