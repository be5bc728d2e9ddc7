use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use keeweb_core::DomainError;
use keeweb_session::{redact, SessionError};
use thiserror::Error;

use crate::response::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Holds the session id for the log line; the client only sees a generic message.
    #[error("Session not found: {}", redact(.0))]
    SessionNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthenticationRequired(_) | ApiError::InvalidCredentials(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::SessionNotFound(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::AuthenticationRequired(_) => "AuthenticationRequired",
            ApiError::InvalidCredentials(_) => "InvalidCredentials",
            ApiError::InvalidArgument(_) => "InvalidArgument",
            ApiError::NotFound(_) => "NotFound",
            ApiError::MethodNotAllowed(_) => "MethodNotAllowed",
            ApiError::SessionNotFound(_) | ApiError::Internal(_) => "InternalError",
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => ApiError::SessionNotFound(id),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidCredentials => {
                ApiError::InvalidCredentials("Credentials are invalid.".to_string())
            }
            DomainError::GroupNotFound(_) => {
                ApiError::InvalidArgument("Group with specified ID not found.".to_string())
            }
            DomainError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match self {
            ApiError::AuthenticationRequired(msg) | ApiError::InvalidCredentials(msg) => {
                tracing::warn!("Unauthorized: {}", msg);
                msg
            }
            ApiError::InvalidArgument(msg) => {
                tracing::warn!("Invalid argument: {}", msg);
                msg
            }
            ApiError::NotFound(msg) | ApiError::MethodNotAllowed(msg) => {
                tracing::warn!("{}: {}", code, msg);
                msg
            }
            ApiError::SessionNotFound(id) => {
                tracing::error!("Session vanished while handling request: {}", redact(&id));
                "Internal error".to_string()
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal error".to_string()
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::AuthenticationRequired("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidCredentials("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidArgument("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::SessionNotFound("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_session_error_is_internal() {
        let err: ApiError = SessionError::NotFound("abc".into()).into();
        assert!(matches!(err, ApiError::SessionNotFound(ref id) if id == "abc"));
        assert_eq!(err.code(), "InternalError");
    }

    #[test]
    fn test_session_id_is_redacted() {
        let sid = "0f8fad5b-d9cb-469f-a165-70867728950e";
        let err: ApiError = SessionError::NotFound(sid.into()).into();
        assert_eq!(err.to_string(), "Session not found: 0f8fad5b...");

        let body = err.into_response();
        assert_eq!(body.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_domain_error_mapping() {
        let err: ApiError = DomainError::InvalidCredentials.into();
        assert!(matches!(err, ApiError::InvalidCredentials(_)));

        let err: ApiError = DomainError::GroupNotFound("g".into()).into();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }
}
