use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::categories::CategoryError;
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Internal Server Error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error_type) = match &self {
            ApiError::Category(_) => (StatusCode::BAD_REQUEST, "CategoryError"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BadRequest"),
            ApiError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "InternalError"),
        };

        let error_message = match &self {
            ApiError::Category(err) => err.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::InternalError(msg) => msg.clone(),
        };
        tracing::debug!("{}: {}", error_type, error_message);

        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
