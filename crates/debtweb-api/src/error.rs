//! Error types for debtweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use debtweb_core::{CoreError, ErrorCode, ErrorDetails};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                ErrorCode::DebtNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                ErrorCode::ImportFailed => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::NotFound { .. } => ErrorDetails::new(ErrorCode::NotFound, self.to_string()),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::ValidationError, self.to_string()),
            ApiError::Core(e) => e.to_details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self.to_details());
        } else {
            log::debug!("{}: {}", status, self);
        }
        (status, Json(self.to_details())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let error: ApiError = CoreError::DebtNotFound { id: "debt-000009".to_string() }.into();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);

        let error: ApiError = CoreError::IoError { path: "data/debts.json".to_string() }.into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::BadRequest { message: "missing status".to_string() };
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_details().code, ErrorCode::ValidationError);
    }
}
