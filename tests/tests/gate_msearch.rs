//! Tests for `_msearch` body screening.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::mocks::Outcome;
use integration_tests::setup::{basic_auth, TestContext};

fn msearch_body(lines: &[&str]) -> String {
    let mut body = lines.join("\n");
    body.push('\n');
    body
}

#[tokio::test]
async fn test_authorized_single_reference_short_circuits() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");
    ctx.checker.set("a", Outcome::Grant);

    let body = msearch_body(&[
        r#"{"index":"a-logs"}"#,
        r#"{"query":{"match_all":{}}}"#,
        r#"{"index":"b-logs"}"#,
        r#"{"query":{"match_all":{}}}"#,
    ]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status_ok();
    assert_eq!(
        ctx.checker.calls(),
        vec!["a".to_string()],
        "later lines must not be evaluated after the first authorized single reference"
    );
}

#[tokio::test]
async fn test_multi_reference_requires_every_account() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");
    ctx.checker.set("a", Outcome::Grant);
    ctx.checker.set("b", Outcome::NotFound);
    ctx.checker.set("c", Outcome::Grant);

    let body = msearch_body(&[r#"{"index":["a-1","b-2","c-3"]}"#, r#"{"query":{}}"#]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["code"], "UnauthorizedIndex");
    assert_eq!(json["error"], "b");
    assert_eq!(
        ctx.checker.calls(),
        vec!["a".to_string(), "b".to_string()],
        "evaluation must stop at the first unauthorized element"
    );
}

#[tokio::test]
async fn test_allowed_body_reaches_downstream_unchanged() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");
    ctx.checker.set("a", Outcome::Grant);

    let body = msearch_body(&[
        r#"{"index":"a-logs","ignore_unavailable":true}"#,
        r#"{"query":{"range":{"@timestamp":{"gte":"now-1h"}}},"size":500}"#,
    ]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body.clone())
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.as_bytes().as_ref(),
        body.as_bytes(),
        "downstream must see the original body bytes"
    );
}

#[tokio::test]
async fn test_body_without_index_references_is_allowed() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let body = msearch_body(&[r#"{"search_type":"query_then_fetch"}"#, r#"{"query":{}}"#]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status_ok();
    assert_eq!(ctx.checker.call_count(), 0);
}

#[tokio::test]
async fn test_all_single_references_unauthorized_is_denied() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");
    ctx.checker.set("a", Outcome::NotFound);
    ctx.checker.set("b", Outcome::NotFound);

    let body = msearch_body(&[
        r#"{"index":"a-logs"}"#,
        r#"{"query":{}}"#,
        r#"{"index":"b-logs"}"#,
        r#"{"query":{}}"#,
    ]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["code"], "Unauthorized");
    assert_eq!(ctx.checker.calls(), vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn test_index_of_wrong_type_is_fatal() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let body = msearch_body(&[r#"{"index":42}"#, r#"{"query":{}}"#]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["code"], "MsearchPostBodyIdxLineError");
    assert_eq!(ctx.checker.call_count(), 0);
}

#[tokio::test]
async fn test_unparseable_line_is_fatal() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");
    ctx.checker.set("a", Outcome::Grant);

    let body = msearch_body(&[r#"{"index":"a-logs""#, r#"{"query":{}}"#]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["code"], "MsearchPostBodyIdxLineError");
}

#[tokio::test]
async fn test_index_without_account_prefix_is_fatal() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");

    let body = msearch_body(&[r#"{"index":"logs"}"#, r#"{"query":{}}"#]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["code"], "MsearchPostBodyIdxLineError");
    assert_eq!(ctx.checker.call_count(), 0);
}

#[tokio::test]
async fn test_oracle_outage_during_scan_is_a_lookup_error() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router).expect("Failed to create test server");
    ctx.checker.set("a", Outcome::Unreachable);

    let body = msearch_body(&[r#"{"index":["a-1","b-2"]}"#, r#"{"query":{}}"#]);

    let response = server
        .post("/_msearch")
        .add_header("Authorization", basic_auth("alice", "secret1"))
        .text(body)
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: serde_json::Value = response.json();
    assert_eq!(json["code"], "AccountLookupError");
    assert_eq!(ctx.checker.calls(), vec!["a".to_string()]);
}
