//! REST API endpoints for date range operations.
//!
//! Every write is reconciled against the stored ranges by the commit
//! orchestrator, so a successful response always leaves the stored ranges
//! pairwise non-overlapping.

use crate::ApiApplication;
use aide::{
    axum::{
        ApiRouter,
        routing::{get, get_with},
    },
    transform::TransformOperation,
};
use drs_core::models::CommitSummary;

mod crud;
use crud::*;

mod list;
use list::*;

/// Path parameter for single-range endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct Key {
    /// The first day of the range, `YYYY-MM-DD`
    start: String,
}

/// Creates a router with date range endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            get_with(list_intervals::<T>, list_intervals_docs)
                .post_with(create_interval::<T>, create_interval_docs)
                .delete_with(clear_intervals::<T>, clear_intervals_docs),
            |route| route.tag("daterange"),
        )
        .api_route_with(
            "/{start}",
            get(read_interval::<T>)
                .put_with(update_interval::<T>, update_interval_docs)
                .delete(delete_interval::<T>),
            |route| route.tag("daterange"),
        )
}

fn list_intervals_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("List date ranges")
        .description(
            r#"
            List the stored ranges ordered by start date.

            Query parameters of the form `field[.op]=value` narrow the result,
            e.g. `start.gte=2024-01-01&price.lt=10`. Fields are `start`, `end`
            and `price`; operators are `eq` (default), `ne`, `lt`, `lte`, `gt`
            and `gte`.
            "#,
        )
        .response_with::<400, String, _>(|res| res.description("Unknown field, operator or malformed value"))
        .response_with::<500, String, _>(|res| res.description("Database query failed"))
}

fn create_interval_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Write a date range")
        .description(
            r#"
            Write a priced range, trimming, splitting or replacing any stored
            range it overlaps. Ranges that merely touch it are left alone.
            "#,
        )
        .response_with::<201, axum::Json<CommitSummary>, _>(|res| {
            res.description("The number of rows deleted and added")
        })
        .response_with::<400, String, _>(|res| res.description("Malformed range"))
        .response_with::<409, String, _>(|res| {
            res.description("A concurrent write changed the neighboring ranges; retry")
        })
        .response_with::<503, String, _>(|res| res.description("Neighbor lookup failed; retry"))
        .response_with::<500, String, _>(|res| res.description("The write was rolled back"))
}

fn update_interval_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Rewrite a date range")
        .description(
            r#"
            Rewrite the range starting on `start`, reconciling its neighbors
            exactly as a create does. The payload must keep the same start.
            "#,
        )
        .response_with::<400, String, _>(|res| {
            res.description("Malformed range, or the payload start differs from the path")
        })
        .response_with::<404, String, _>(|res| res.description("No range starts on that day"))
        .response_with::<409, String, _>(|res| {
            res.description("A concurrent write changed the neighboring ranges; retry")
        })
}

fn clear_intervals_docs(op: TransformOperation) -> TransformOperation<'_> {
    op.summary("Delete every date range")
        .tag("admin")
        .response_with::<500, String, _>(|res| res.description("Database operation failed"))
}
