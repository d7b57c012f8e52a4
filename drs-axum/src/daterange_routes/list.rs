use crate::{
    ApiApplication,
    error::{ApiError, bad_request, storage_error},
};
use axum::{
    Json,
    extract::{Query, State},
};
use drs_core::{
    models::{Interval, IntervalQuery},
    ports::IntervalRepository as _,
};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{Level, event};

/// The result of a bulk delete
#[derive(Serialize, JsonSchema)]
pub(crate) struct Cleared {
    /// How many ranges were removed
    deleted: u64,
}

pub(crate) async fn list_intervals<T: ApiApplication>(
    State(app): State<T>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<Json<Vec<Interval>>, ApiError> {
    let db = app.database();

    let intervals = if params.is_empty() {
        db.list_intervals().await
    } else {
        let query = IntervalQuery::from_params(&params).map_err(bad_request)?;
        db.query_intervals(&query).await
    }
    .map_err(|err| storage_error(err, "failed to list ranges".to_string()))?;

    Ok(Json(intervals))
}

pub(crate) async fn clear_intervals<T: ApiApplication>(
    State(app): State<T>,
) -> Result<Json<Cleared>, ApiError> {
    let deleted = app
        .database()
        .clear()
        .await
        .map_err(|err| storage_error(err, "failed to delete ranges".to_string()))?;
    event!(Level::WARN, deleted, "cleared every stored range");
    Ok(Json(Cleared { deleted }))
}
