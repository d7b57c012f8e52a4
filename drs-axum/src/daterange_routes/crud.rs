use super::Key;
use crate::{
    ApiApplication,
    error::{ApiError, bad_request, storage_error, write_error},
};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use drs_core::{
    models::{CommitSummary, Interval, IntervalDto, parse_date},
    orchestrator::CommitOrchestrator,
    ports::IntervalRepository as _,
};

/// Write a new date range, reconciling any overlapped neighbors.
///
/// # Returns
///
/// - `201 Created`: The number of rows deleted and added
/// - `400 Bad Request`: Malformed dates or price, or an empty range
/// - `409 Conflict`: The neighbors changed while the write was in flight
/// - `503 Service Unavailable`: The neighbor lookup failed
/// - `500 Internal Server Error`: The write failed and was rolled back
pub(crate) async fn create_interval<T: ApiApplication>(
    State(app): State<T>,
    Json(body): Json<IntervalDto>,
) -> Result<(StatusCode, Json<CommitSummary>), ApiError> {
    let candidate = Interval::try_from(body).map_err(bad_request)?;
    let summary = CommitOrchestrator::new(app.database())
        .create(candidate)
        .await
        .map_err(write_error)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// Retrieve the date range starting on the given day.
///
/// # Returns
///
/// - `200 OK`: The stored range
/// - `400 Bad Request`: The key is not a `YYYY-MM-DD` date
/// - `404 Not Found`: No range starts on that day
/// - `500 Internal Server Error`: Database query failed
pub(crate) async fn read_interval<T: ApiApplication>(
    State(app): State<T>,
    Path(Key { start }): Path<Key>,
) -> Result<Json<Interval>, ApiError> {
    let key = parse_date("start", &start).map_err(bad_request)?;
    let interval = app
        .database()
        .get_interval(key)
        .await
        .map_err(|err| storage_error(err, format!("failed to get range {key}")))?
        .ok_or((StatusCode::NOT_FOUND, format!("no range starts on {key}")))?;
    Ok(Json(interval))
}

/// Rewrite an existing date range.
///
/// The payload's start must equal the path key. The new span and price are
/// reconciled against the neighbors exactly as a create is.
///
/// # Returns
///
/// - `200 OK`: The number of rows deleted and added
/// - `400 Bad Request`: Malformed payload, or a payload start that differs from the path
/// - `404 Not Found`: No range starts on that day
/// - `409 Conflict`: The neighbors changed while the write was in flight
/// - `500 Internal Server Error`: The write failed and was rolled back
pub(crate) async fn update_interval<T: ApiApplication>(
    State(app): State<T>,
    Path(Key { start }): Path<Key>,
    Json(body): Json<IntervalDto>,
) -> Result<Json<CommitSummary>, ApiError> {
    let key = parse_date("start", &start).map_err(bad_request)?;
    let candidate = Interval::try_from(body).map_err(bad_request)?;
    let summary = CommitOrchestrator::new(app.database())
        .update(key, candidate)
        .await
        .map_err(write_error)?;
    Ok(Json(summary))
}

/// Delete the date range starting on the given day.
///
/// Neighbors are left as they are, so this may open a gap.
///
/// # Returns
///
/// - `200 OK`: The range was deleted
/// - `400 Bad Request`: The key is not a `YYYY-MM-DD` date
/// - `404 Not Found`: No range starts on that day
/// - `500 Internal Server Error`: Database operation failed
pub(crate) async fn delete_interval<T: ApiApplication>(
    State(app): State<T>,
    Path(Key { start }): Path<Key>,
) -> Result<String, ApiError> {
    let key = parse_date("start", &start).map_err(bad_request)?;
    let deleted = app
        .database()
        .delete_interval(key)
        .await
        .map_err(|err| storage_error(err, format!("failed to delete range {key}")))?;

    if deleted {
        Ok(format!("deleted range starting {key}"))
    } else {
        Err((StatusCode::NOT_FOUND, format!("no range starts on {key}")))
    }
}
