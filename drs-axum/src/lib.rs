#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod daterange_routes;
mod error;

use aide::{
    axum::{ApiRouter, routing::get},
    openapi::OpenApi,
};
use axum::{Extension, Json, http::header};
use drs_core::ports::Application;
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors;

mod openapi;
use openapi::{api_docs, docs_routes};

pub mod config;
use config::AxumConfig;

/// Response for the health check endpoint
#[derive(Serialize, JsonSchema)]
#[schemars(inline)]
struct HealthResponse {
    status: String,
}

/// Simple health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Construct a full API router with the given state.
///
/// The generated OpenAPI document is returned alongside the router, so that a
/// binary can export it without serving anything.
pub fn router<T: ApiApplication>(state: T) -> (axum::Router, Arc<OpenApi>) {
    let mut api = OpenApi::default();

    // Browser clients call the API directly, and no credentials are involved
    let policy = cors::CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers([header::CONTENT_TYPE]);

    let router = ApiRouter::new()
        .api_route("/health", get(health_check))
        .nest("/daterange", daterange_routes::router())
        .nest_api_service("/docs", docs_routes())
        .finish_api_with(&mut api, api_docs);

    let api = Arc::new(api);
    let router = router
        .layer(Extension(api.clone())) // Arc is very important here or you will face massive memory and performance issues
        .layer(policy)
        .with_state(state);

    (router, api)
}

/// Starts the HTTP server with the provided configuration
pub async fn start_server<T: ApiApplication>(
    config: AxumConfig,
    app: T,
) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    tracing::info!("Listening for requests on {}", listener.local_addr()?);

    let (service, _) = router(app);
    axum::serve(listener, service).await
}

/// Axum imposes all sorts of constraints on what can pass for state. This
/// trait, coupled with a blanket implementation, specifies it all upfront and
/// in one place. If a function takes a generic `T: ApiApplication`, then
/// everything one might reasonably want to do should work.
pub trait ApiApplication:
    Clone + Send + Sync + 'static + Application<Repository: Clone + Send + Sync + 'static>
{
}

// this is the blanket implementation
impl<T: Clone + Send + Sync + 'static> ApiApplication for T where
    T: Application<Repository: Clone + Send + Sync + 'static>
{
}
