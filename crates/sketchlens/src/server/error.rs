//! JSON error responses for the HTTP API.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sketchlens_core::ServiceError;

/// An error body of the form `{success:false, error, details?}`.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::warn!("Bad request: {}", msg);
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg,
            details: None,
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.public_message());
        }
        match &err {
            ServiceError::Internal(detail) => tracing::error!("Internal error: {detail}"),
            other => tracing::error!("{other}"),
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.public_message(),
            details: err.details().map(String::from),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        let status = rejection.status();
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Payload too large"
        } else {
            "Failed to read request body"
        };
        Self {
            status,
            message: message.to_string(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            success: bool,
            error: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<&'a str>,
        }

        (
            self.status,
            Json(ErrorBody {
                success: false,
                error: &self.message,
                details: self.details.as_deref(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        let err: ApiError = ServiceError::InvalidInput("No canvas data provided".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No canvas data provided");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err: ApiError = ServiceError::Internal("mutex poisoned".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_orchestration_failure_keeps_details() {
        let err: ApiError = ServiceError::OrchestrationFailure {
            message: "Image generation failed".into(),
            details: "pollinations: HTTP 502: bad gateway".into(),
            attempts: vec![],
        }
        .into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details.as_deref(), Some("pollinations: HTTP 502: bad gateway"));
    }
}
