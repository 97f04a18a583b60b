//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cryptiomt_applications::ApplicationError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// Error body returned by every failing API call
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "unauthorized")]
    pub error: String,
    pub message: String,
    /// Operation kind for authentication and authorization failures
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "read_all_customers")]
    pub operation: Option<String>,
}

/// Application error carried to the HTTP boundary
#[derive(Debug)]
pub struct ApiError(pub ApplicationError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        ApiError(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            ApplicationError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApplicationError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApplicationError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApplicationError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApplicationError::Store { .. } | ApplicationError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match &self.0 {
            ApplicationError::Unauthenticated { .. } => "unauthenticated",
            ApplicationError::Unauthorized { .. } => "unauthorized",
            ApplicationError::NotFound { .. } => "not_found",
            ApplicationError::Validation { .. } => "validation_error",
            ApplicationError::Store { .. } => "store_error",
            ApplicationError::Config { .. } => "configuration_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.0.to_string(),
            operation: self.0.operation().map(str::to_string),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApplicationError::unauthenticated("read_customer"), StatusCode::UNAUTHORIZED),
            (ApplicationError::unauthorized("read_customer"), StatusCode::FORBIDDEN),
            (ApplicationError::not_found("customer", "c1"), StatusCode::NOT_FOUND),
            (ApplicationError::validation("name", "must not be blank"), StatusCode::BAD_REQUEST),
            (
                ApplicationError::Store {
                    message: "disk full".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ApplicationError::config("bad url"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError(error).status(), expected);
        }
    }
}
