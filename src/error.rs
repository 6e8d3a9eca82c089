//! Application error type.
//!
//! # Data Flow
//! ```text
//! handler / pipeline stage / fallback
//!     → AppError (operational | unexpected)
//!     → into_response(): bare status + ErrorReport extension
//!     → http::error_handler (the only place that renders a body)
//! ```
//!
//! # Design Decisions
//! - Two variants instead of a runtime "is operational" flag
//! - Unexpected errors never reach the client; their message is masked
//! - Status label is derived from the status class: 4xx is "fail", anything else "error"

use std::borrow::Cow;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Boxed error used for unexpected failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Message shown to clients in place of any unexpected error.
pub const MASKED_MESSAGE: &str = "Something went very wrong!";

/// Error produced anywhere in the request chain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Anticipated failure, safe to report verbatim.
    #[error("{message}")]
    Operational {
        status: StatusCode,
        message: Cow<'static, str>,
    },

    /// Programming or runtime fault. Logged, then masked.
    #[error("unexpected error: {0}")]
    Unexpected(#[source] BoxError),
}

impl AppError {
    pub fn operational(status: StatusCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Operational {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, message)
    }

    /// Error for a request no route group claimed.
    ///
    /// `original_url` is the path plus query string as the client sent it.
    pub fn route_not_found(original_url: &str) -> Self {
        Self::not_found(format!("Can't find {original_url} on this server! "))
    }

    pub fn payload_too_large() -> Self {
        Self::operational(StatusCode::PAYLOAD_TOO_LARGE, "request entity too large")
    }

    pub fn unexpected(error: impl Into<BoxError>) -> Self {
        Self::Unexpected(error.into())
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, Self::Operational { .. })
    }

    /// HTTP status sent to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Operational { status, .. } => *status,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client.
    pub fn client_message(&self) -> &str {
        match self {
            Self::Operational { message, .. } => message,
            Self::Unexpected(_) => MASKED_MESSAGE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Operational { .. } => "operational",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

/// `"fail"` for client errors, `"error"` for everything else.
pub fn status_label(status: StatusCode) -> &'static str {
    if status.is_client_error() {
        "fail"
    } else {
        "error"
    }
}

/// JSON error body for API consumers.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub status: &'static str,
    pub message: &'a str,
}

impl<'a> ErrorBody<'a> {
    pub fn from_error(error: &'a AppError) -> Self {
        Self {
            status: status_label(error.status()),
            message: error.client_message(),
        }
    }
}

/// Response extension carrying the error to the global error handler.
#[derive(Debug, Clone)]
pub struct ErrorReport(pub Arc<AppError>);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();
        response.extensions_mut().insert(ErrorReport(Arc::new(self)));
        response
    }
}

/// Result alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
