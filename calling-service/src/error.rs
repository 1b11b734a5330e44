use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // `detail` is only filled in when DEBUG is on.
    #[error("Failed to fetch ID token")]
    TokenFetch { detail: Option<String> },

    // The receiving service answered with a non-success status; relay it.
    #[error("{body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Failed to reach Service B")]
    Unreachable { detail: Option<String> },

    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponseBody {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::TokenFetch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_FETCH_FAILED")
            }
            AppError::Upstream { status, .. } => (*status, "UPSTREAM_ERROR"),
            AppError::Unreachable { .. } => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let message = match &self {
            AppError::TokenFetch {
                detail: Some(detail),
            }
            | AppError::Unreachable {
                detail: Some(detail),
            } => format!("{self}: {detail}"),
            _ => self.to_string(),
        };

        let body = ErrorResponseBody {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}
