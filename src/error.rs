//! Error types for the pipeline
//!
//! Provides unified error handling using thiserror. Errors never cross a
//! middleware boundary as faults: handlers turn them into [`Response`]s.

use http::StatusCode;
use thiserror::Error;

use crate::models::Response;

// == Pipeline Error Enum ==
/// Unified error type for the pipeline and its services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A route was registered twice for the same method and path
    #[error("Duplicate route: {0}")]
    DuplicateRoute(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with existing state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Status code this error maps to when returned to a caller.
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::Conflict(_) => StatusCode::CONFLICT,
            PipelineError::DuplicateRoute(_) | PipelineError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// == Response Conversion ==
impl From<PipelineError> for Response {
    fn from(err: PipelineError) -> Self {
        let status = err.status();
        let message = match err {
            PipelineError::DuplicateRoute(msg)
            | PipelineError::InvalidRequest(msg)
            | PipelineError::NotFound(msg)
            | PipelineError::Conflict(msg)
            | PipelineError::Internal(msg) => msg,
        };
        Response::error(status, message)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;
