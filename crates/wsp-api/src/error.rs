//! API error type and its HTTP mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use wsp_core::{FieldError, StoreError, ValidationErrors};

use crate::auth::AuthError;
use crate::context::new_request_id;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Field-level validation failures
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Request body could not be read as JSON
    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store gateway failure
    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    #[serde(rename = "requestId")]
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                error_code = %code,
                error_message = %self,
                "request rejected"
            );
        }

        let message = self.to_string();
        let details = match self {
            ApiError::Validation(errors) => Some(errors.into_errors()),
            _ => None,
        };

        let body = ErrorBody {
            code: code.to_string(),
            message,
            details,
        };

        // The request-id middleware re-renders this with the request's own id
        render_error(status, body, new_request_id())
    }
}

/// JSON error response; the body is also kept as a response extension
pub fn render_error(status: StatusCode, body: ErrorBody, request_id: String) -> Response {
    let mut response = (
        status,
        Json(ErrorResponse {
            error: body.clone(),
            request_id,
        }),
    )
        .into_response();
    response.extensions_mut().insert(body);
    response
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::NotFound(msg),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Backend(msg) => ApiError::Store(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::WrongPassword => {
                ApiError::Unauthorized(err.to_string())
            }
            AuthError::Forbidden(_) => ApiError::Forbidden(err.to_string()),
            AuthError::UnknownUser(_) => ApiError::NotFound(err.to_string()),
            AuthError::Hash(_) | AuthError::Token(_) | AuthError::Worker(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_lists_fields() {
        let errors = ValidationErrors::single("toDate", "toDate is not a valid datetime in the past");
        let (status, json) = body_json(ApiError::from(errors)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["details"][0]["field"], "toDate");
        assert!(json["requestId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn store_errors_map_to_status() {
        let (status, json) = body_json(StoreError::Backend("pool timed out".into()).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "STORE_ERROR");
        assert!(json["error"].get("details").is_none());

        let (status, _) = body_json(StoreError::Conflict("duplicate".into()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = body_json(StoreError::NotFound("user".into()).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn auth_errors_map_to_status() {
        let (status, _) = ApiError::from(AuthError::MissingToken).status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) =
            ApiError::from(AuthError::Forbidden(wsp_core::Role::Read)).status_and_code();
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = ApiError::from(AuthError::UnknownUser("ghost".into())).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
