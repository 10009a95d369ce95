//! Tests for credential and request-shape screening.
//!
//! The gate is allow-list only: GET `/{index}/_mapping` and POST `/_msearch`
//! are the only shapes that can ever reach the upstream.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::setup::{basic_auth, TestContext};

#[tokio::test]
async fn test_missing_credentials_denied_without_oracle_call() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let response = server.get("/tenant42-logs/_mapping").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "Unauthorized");
    assert_eq!(ctx.checker.call_count(), 0, "no key check may happen");
}

#[tokio::test]
async fn test_non_basic_scheme_denied() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let response = server
        .get("/tenant42-logs/_mapping")
        .add_header("Authorization", "Bearer some-token")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "Unauthorized");
}

#[tokio::test]
async fn test_get_other_than_mapping_denied() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let response = server
        .get("/tenant42-logs/_search")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NonMappingGetRequest");
    assert_eq!(ctx.checker.call_count(), 0);
}

#[tokio::test]
async fn test_post_other_than_msearch_denied() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let response = server
        .post("/_bulk")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text("{}")
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "NonMsearchPostRequest");
}

#[tokio::test]
async fn test_mutating_methods_denied() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let put = server
        .put("/tenant42-logs")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text("{}")
        .await;
    put.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = put.json();
    assert_eq!(body["code"], "UnauthorizedRequest");

    let delete = server
        .delete("/tenant42-logs")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .await;
    delete.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = delete.json();
    assert_eq!(body["code"], "UnauthorizedRequest");

    assert_eq!(ctx.checker.call_count(), 0);
}

#[tokio::test]
async fn test_configured_prefix_is_stripped() {
    use integration_tests::mocks::Outcome;

    let ctx = TestContext::with_prefix("/es");
    let server = TestServer::new(ctx.router).expect("Failed to create test server");
    ctx.checker.set("tenant42", Outcome::Grant);

    let response = server
        .get("/es/tenant42-logs/_mapping")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .await;

    response.assert_status_ok();
    assert_eq!(ctx.checker.calls(), vec!["tenant42".to_string()]);
}
