use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::response::ErrorResponse;
use crate::sales_time_series::TimeSeriesError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    InternalError(String),
    DatabaseError(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn database_error(msg: impl Into<String>) -> Self {
        Self::DatabaseError(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorResponse {
        match self {
            ApiError::BadRequest(msg) => ErrorResponse::client(msg),
            ApiError::NotFound(msg) => ErrorResponse::client(format!("{} not found", msg)),
            ApiError::InternalError(msg) => ErrorResponse::server(msg),
            ApiError::DatabaseError(msg) => ErrorResponse::server(msg),
        }
    }
}

impl From<TimeSeriesError> for ApiError {
    fn from(err: TimeSeriesError) -> Self {
        match err {
            e if e.is_validation() => ApiError::bad_request(e.to_string()),
            TimeSeriesError::Store(e) => ApiError::database_error(e.to_string()),
            e => ApiError::internal_error(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        (status, Json(self.body())).into_response()
    }
}
