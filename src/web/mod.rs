//! HTTP surface
//!
//! Handlers return [`Result<T>`](Result); every failure funnels through
//! [`ApiError`], which picks the status code and writes a `{ "error": ... }`
//! body. Store faults are logged here and reach the client without detail.

pub mod cart;
pub mod handlers;
pub mod resolver;
pub mod routes;
pub mod state;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::core::StoreError;
use crate::reservation::ReservationError;

pub use resolver::ResolvedCollection;
pub use routes::build_router;
pub use state::AppState;

/// Body sent for every upstream fault.
pub const GENERIC_ERROR: &str = "An error occurred";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: String,
}

impl MessageResponse {
    pub fn success() -> Self {
        Self {
            msg: "Success".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("store not ready")]
    NotReady,

    #[error("{0}")]
    Malformed(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    NoCapacity(String),

    #[error("{0}")]
    Conflict(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("upstream fault: {0}")]
    Upstream(StoreError),

    #[error("internal server error")]
    Internal,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::Malformed(_) | Self::NoCapacity(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream(_) | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotReady => Self::NotReady,
            StoreError::InvalidObjectId(_)
            | StoreError::InvalidDocument(_)
            | StoreError::InvalidUpdate(_)
            | StoreError::ImmutableField(_) => Self::Malformed(err.to_string()),
            StoreError::DuplicateKey(_) => Self::Conflict(err.to_string()),
            StoreError::ConnectionError(_) | StoreError::SnapshotError(_) | StoreError::IoError(_) => {
                Self::Upstream(err)
            }
        }
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::NoCapacity(_) => Self::NoCapacity(err.to_string()),
            ReservationError::CourseNotFound(_) => Self::NotFound(err.to_string()),
            ReservationError::Store(inner) => inner.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Upstream(err) => {
                error!(error = %err, "store operation failed");
                GENERIC_ERROR.to_string()
            }
            Self::Internal => GENERIC_ERROR.to_string(),
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// `Json` whose rejection is an [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `Path` whose rejection is an [`ApiError`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParams<T>(pub T);
