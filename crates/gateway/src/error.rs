//! Mapping of pipeline errors onto HTTP responses.

use agentrouter_core::error::{Error, StoreError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Whether the same request may succeed if retried later.
    pub retryable: bool,
}

/// An error with the status it is served under.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                retryable: false,
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn from_store(e: StoreError) -> Self {
        Error::Store(e).into()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Rejected(message) => Self::bad_request(message),
            // Any provider failure is per-request; the intent is never guessed.
            Error::Embedding(inner) => {
                warn!(error = %inner, transient = inner.is_retryable(), "Embedding provider failure");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: ErrorResponse {
                        error: format!("embedding provider unavailable: {inner}"),
                        retryable: true,
                    },
                }
            }
            Error::Store(inner) => {
                warn!(error = %inner, "Config store failure");
                Self {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: ErrorResponse {
                        error: format!("config store unavailable: {inner}"),
                        retryable: true,
                    },
                }
            }
            Error::Config { message } => Self::bad_request(message),
            other => {
                error!(error = %other, "Request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
