use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Transport-level request errors. Engine failures are not ApiErrors:
/// they come back as classified outcomes inside a CheckResponse.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing plate")]
    MissingPlate,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    ok: bool,
    error: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingPlate => StatusCode::BAD_REQUEST,
            ApiError::UnknownProvider(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            ok: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
