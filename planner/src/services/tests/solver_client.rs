//! Tests for RealSolverClient against a mock HTTP solver

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common::sample_request;
use crate::error::PlannerError;
use crate::services::RealSolverClient;
use crate::traits::SolverClient;
use shared::SolverStatus;

fn client_for(server: &MockServer) -> RealSolverClient {
    RealSolverClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_optimize_posts_request_and_parses_response() {
    let server = MockServer::start().await;
    let request = sample_request();
    let table_id = request.tables[0].id.to_string();

    Mock::given(method("POST"))
        .and(path("/v1/optimize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OPTIMAL",
            "objective_value": 3.0,
            "tables": [{
                "table_id": table_id,
                "seats": [
                    {"seat_index": 0, "guest_id": "g:0", "guest_name": "Alice"},
                    {"seat_index": 1, "guest_id": null, "guest_name": null}
                ]
            }],
            "solver_stats": {"conflicts": 0, "branches": 12, "wall_time_seconds": 0.01}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client_for(&server).optimize(&request).await.unwrap();
    assert_eq!(response.status, SolverStatus::Optimal);
    assert_eq!(response.objective_value, Some(3.0));
    assert_eq!(response.tables[0].seats.len(), 2);
    assert_eq!(response.solver_stats.branches, 12);

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["tables"][0]["capacity"], 8);
    assert_eq!(body["tables"][0]["label"], "Table 1");
}

#[tokio::test]
async fn test_infeasible_is_returned_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/optimize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "INFEASIBLE",
            "objective_value": null,
            "tables": [],
            "solver_stats": {"conflicts": 4, "branches": 9, "wall_time_seconds": 0.2}
        })))
        .mount(&server)
        .await;

    let response = client_for(&server).optimize(&sample_request()).await.unwrap();
    assert_eq!(response.status, SolverStatus::Infeasible);
    assert!(response.tables.is_empty());
}

#[tokio::test]
async fn test_rejection_uses_detail_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/optimize"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "capacity must be positive"})))
        .mount(&server)
        .await;

    let err = client_for(&server).optimize(&sample_request()).await.unwrap_err();
    match err {
        PlannerError::SolverRejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "capacity must be positive");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejection_without_detail_uses_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/optimize"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server).optimize(&sample_request()).await.unwrap_err();
    assert!(matches!(
        err,
        PlannerError::SolverRejected { status: 500, ref message } if message == "Internal Server Error"
    ));
}

#[tokio::test]
async fn test_unparseable_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/optimize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "SOMETHING_ELSE"})))
        .mount(&server)
        .await;

    let err = client_for(&server).optimize(&sample_request()).await.unwrap_err();
    assert!(matches!(err, PlannerError::InvalidSolverResponse { .. }));
}

#[tokio::test]
async fn test_timeout_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/optimize"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = RealSolverClient::new(&server.uri(), Duration::from_millis(50)).unwrap();
    let err = client.optimize(&sample_request()).await.unwrap_err();
    assert!(matches!(err, PlannerError::SolverRequestFailed { .. }));
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "version": "1.2.0"})))
        .mount(&server)
        .await;

    let health = client_for(&server).health_check().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, "1.2.0");
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let client = RealSolverClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000");
}
