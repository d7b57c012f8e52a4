use axum::http::StatusCode;
use axum_test::TestServer;
use drs_axum::router;
use drs_core::models::{CommitSummary, Interval};
use rstest::*;
use serde_json::{Value, json};

mod app;
use app::TestApp;

async fn server() -> TestServer {
    let (router, _) = router(TestApp::new().await);
    TestServer::new(router).unwrap()
}

fn iv(start: &str, end: &str, price: &str) -> Interval {
    Interval::parse(start, end, price).unwrap()
}

async fn post(server: &TestServer, start: &str, end: &str, price: &str) -> CommitSummary {
    let response = server
        .post("/daterange")
        .json(&json!({"start": start, "end": end, "price": price}))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn list(server: &TestServer) -> Vec<Interval> {
    let response = server.get("/daterange").await;
    response.assert_status_ok();
    response.json()
}

#[test_log::test(tokio::test)]
async fn test_health() {
    let server = server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({"status": "ok"}));
}

#[test_log::test(tokio::test)]
async fn test_openapi_document_is_served() {
    let server = server().await;
    let response = server.get("/docs/api.json").await;
    response.assert_status_ok();
    let doc: Value = response.json();
    assert_eq!(doc["info"]["title"], "Daterange API");
    let paths = doc["paths"].as_object().unwrap();
    assert!(paths.keys().any(|path| path.starts_with("/daterange")));
}

#[test_log::test(tokio::test)]
async fn test_split_through_http() {
    let server = server().await;

    let summary = post(&server, "2024-01-01", "2024-12-31", "10").await;
    assert_eq!(
        summary,
        CommitSummary {
            deleted: 0,
            added: 1
        }
    );

    let summary = post(&server, "2024-06-01", "2024-06-30", "20.50").await;
    assert_eq!(
        summary,
        CommitSummary {
            deleted: 1,
            added: 3
        }
    );

    assert_eq!(
        list(&server).await,
        vec![
            iv("2024-01-01", "2024-06-01", "10"),
            iv("2024-06-01", "2024-06-30", "20.50"),
            iv("2024-06-30", "2024-12-31", "10"),
        ]
    );

    let response = server.get("/daterange/2024-06-01").await;
    response.assert_status_ok();
    response.assert_json(&json!({"start": "2024-06-01", "end": "2024-06-30", "price": "20.50"}));
}

#[test_log::test(tokio::test)]
async fn test_filters() {
    let server = server().await;
    post(&server, "2024-01-01", "2024-02-01", "9.5").await;
    post(&server, "2024-02-01", "2024-03-01", "100").await;
    post(&server, "2024-03-01", "2024-04-01", "12").await;

    let response = server
        .get("/daterange")
        .add_query_param("start.gte", "2024-02-01")
        .add_query_param("price.lt", "50")
        .await;
    response.assert_status_ok();
    let found: Vec<Interval> = response.json();
    assert_eq!(found, vec![iv("2024-03-01", "2024-04-01", "12")]);
}

#[rstest]
#[case::unknown_field("id", "1")]
#[case::unknown_operator("start.like", "2024-01-01")]
#[case::malformed_date("end.lt", "2024-13-01")]
#[case::malformed_price("price", "ten")]
#[case::negative_year("start.gte", "-0004-01-01")]
#[test_log::test(tokio::test)]
async fn test_bad_filters_rejected(#[case] key: &str, #[case] value: &str) {
    let server = server().await;
    let response = server.get("/daterange").add_query_param(key, value).await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[rstest]
#[case::inverted("2024-02-01", "2024-01-01", "1")]
#[case::empty("2024-01-01", "2024-01-01", "1")]
#[case::malformed_date("2024-02-30", "2024-03-01", "1")]
#[case::malformed_price("2024-01-01", "2024-02-01", "1,5")]
#[case::negative_year("-0005-01-01", "-0001-01-01", "9")]
#[test_log::test(tokio::test)]
async fn test_bad_writes_rejected(#[case] start: &str, #[case] end: &str, #[case] price: &str) {
    let server = server().await;
    let response = server
        .post("/daterange")
        .json(&json!({"start": start, "end": end, "price": price}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(list(&server).await.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_update() {
    let server = server().await;
    post(&server, "2024-01-01", "2024-03-01", "10").await;
    post(&server, "2024-03-01", "2024-05-01", "11").await;

    let response = server
        .put("/daterange/2024-01-01")
        .json(&json!({"start": "2024-01-01", "end": "2024-04-01", "price": "15"}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        list(&server).await,
        vec![
            iv("2024-01-01", "2024-04-01", "15"),
            iv("2024-04-01", "2024-05-01", "11"),
        ]
    );

    let response = server
        .put("/daterange/2024-01-01")
        .json(&json!({"start": "2024-01-02", "end": "2024-04-01", "price": "15"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .put("/daterange/2024-02-01")
        .json(&json!({"start": "2024-02-01", "end": "2024-04-01", "price": "15"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_delete_one_and_all() {
    let server = server().await;
    post(&server, "2024-01-01", "2024-02-01", "1").await;
    post(&server, "2024-02-01", "2024-03-01", "2").await;
    post(&server, "2024-03-01", "2024-04-01", "3").await;

    server
        .delete("/daterange/2024-02-01")
        .await
        .assert_status_ok();
    server
        .delete("/daterange/2024-02-01")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/daterange/2024-02-01")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/daterange/not-a-date")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server.delete("/daterange").await;
    response.assert_status_ok();
    response.assert_json(&json!({"deleted": 2}));
    assert!(list(&server).await.is_empty());
}
