//! OpenAPI documentation generation and serving.
//!
//! The document itself is assembled by `aide` while the router is built; this
//! module serves it, along with a RapiDoc page for browsing it.

use std::sync::Arc;

use aide::{
    axum::{ApiRouter, IntoApiResponse, routing::get},
    openapi::{OpenApi, Tag},
    transform::TransformOpenApi,
};
use axum::{
    Extension, Json,
    response::{Html, IntoResponse},
};

/// Serve the RapiDoc interactive API documentation interface.
async fn serve_rapidoc() -> impl IntoApiResponse {
    let html = r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <script src="https://cdnjs.cloudflare.com/ajax/libs/rapidoc/9.3.8/rapidoc-min.js" integrity="sha512-0ES6eX4K9J1PrIEjIizv79dTlN5HwI2GW9Ku6ymb8dijMHF5CIplkS8N0iFJ/wl3GybCSqBJu8HDhiFkZRAf0g==" crossorigin="anonymous" referrerpolicy="no-referrer"></script>
  </head>
  <body>
    <rapi-doc spec-url="/docs/api.json"
        show-method-in-nav-bar="as-colored-text"
        use-path-in-nav-bar="true"
    ></rapi-doc>
  </body>
</html>"#;
    Html(html).into_response()
}

/// Creates a router for documentation endpoints.
pub(crate) fn docs_routes() -> ApiRouter {
    ApiRouter::new()
        .route("/", get(serve_rapidoc))
        .route("/api.json", get(serve_docs))
}

/// Serve the raw OpenAPI document as JSON.
async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> impl IntoApiResponse {
    Json(api).into_response()
}

/// Configure the OpenAPI documentation metadata.
pub(crate) fn api_docs(api: TransformOpenApi) -> TransformOpenApi {
    api.title("Daterange API")
        .summary("A REST API for pricing non-overlapping date ranges.")
        .description(
            "Writes are reconciled against the stored ranges: overlapped ranges are trimmed, \
             split or replaced so that every day carries at most one price.",
        )
        .version("0.1")
        .tag(Tag {
            name: "daterange".into(),
            description: Some("Reading and writing priced date ranges".into()),
            ..Default::default()
        })
        .tag(Tag {
            name: "admin".into(),
            description: Some("Bulk maintenance of the stored ranges".into()),
            ..Default::default()
        })
}
