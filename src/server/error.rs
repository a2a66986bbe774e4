//! HTTP error envelope.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with the status
//! that matches the error taxonomy. Storage failures are logged server-side
//! and collapse to an opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::common::auth::AuthError;
use crate::domains::auth::AuthFlowError;
use crate::domains::ActionError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    fn internal(err: anyhow::Error) -> Self {
        error!(error = ?err, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => Self::unauthorized(),
            AuthError::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, message),
            AuthError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            AuthError::Store(inner) => Self::internal(inner),
        }
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match err {
            ActionError::Validation(message) => Self::bad_request(message),
            ActionError::Auth(inner) => inner.into(),
            ActionError::Store(inner) => Self::internal(inner),
        }
    }
}

impl From<AuthFlowError> for ApiError {
    fn from(err: AuthFlowError) -> Self {
        let status = match &err {
            AuthFlowError::Invalid(_) | AuthFlowError::BadToken => StatusCode::BAD_REQUEST,
            AuthFlowError::EmailTaken => StatusCode::CONFLICT,
            AuthFlowError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthFlowError::Unverified => StatusCode::FORBIDDEN,
            AuthFlowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let AuthFlowError::Store(inner) = err {
            Self::internal(inner)
        } else {
            Self::new(status, err.to_string())
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err)
    }
}
