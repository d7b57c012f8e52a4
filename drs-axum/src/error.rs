//! Translation of core errors into HTTP responses.
//!
//! Every handler funnels its failures through here so that status codes stay
//! consistent across endpoints. Anything reported as a server-side failure is
//! logged before the response is built.

use axum::http::StatusCode;
use drs_core::{models::ValidationError, orchestrator::WriteError};
use tracing::{Level, event};

/// The error half of every handler's return type
pub(crate) type ApiError = (StatusCode, String);

/// Map a failed write onto a status code.
pub(crate) fn write_error<E: std::error::Error + 'static>(err: WriteError<E>) -> ApiError {
    let status = match &err {
        WriteError::Validation(_) => StatusCode::BAD_REQUEST,
        WriteError::NotFound(_) => StatusCode::NOT_FOUND,
        WriteError::Conflict(_) => StatusCode::CONFLICT,
        WriteError::Lookup(_) => StatusCode::SERVICE_UNAVAILABLE,
        WriteError::Invariant(_) | WriteError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        event!(Level::ERROR, err = err.to_string());
    } else {
        event!(Level::DEBUG, err = err.to_string());
    }

    (status, err.to_string())
}

/// Reject a malformed request.
pub(crate) fn bad_request(err: ValidationError) -> ApiError {
    event!(Level::DEBUG, err = err.to_string());
    (StatusCode::BAD_REQUEST, err.to_string())
}

/// Report a storage failure on a read or maintenance path.
///
/// The storage error is logged but not echoed to the client.
pub(crate) fn storage_error<E: std::error::Error>(err: E, context: String) -> ApiError {
    event!(Level::ERROR, err = err.to_string());
    (StatusCode::INTERNAL_SERVER_ERROR, context)
}
