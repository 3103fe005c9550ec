// SPDX-License-Identifier: MIT

//! Request validation tests for the HTTP surface.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use tower::ServiceExt;

mod common;

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_exchange_missing_params() {
    let (app, _state) = common::create_test_app();

    let response = app.oneshot(json_post("/exchange", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_exchange_partial_params() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(json_post("/exchange", r#"{"code": "abc123"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activities_missing_user_id() {
    let (app, _state) = common::create_test_app();

    let response = app.oneshot(json_post("/activities", "{}")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activities_offline_db_is_internal_error() {
    let (app, _state) = common::create_test_app();

    // Valid request shape, but the mock database cannot answer the
    // credential lookup.
    let response = app
        .oneshot(json_post("/activities", r#"{"userId": "u1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_create_challenge_rejects_zero_goal() {
    let (app, _state) = common::create_test_app();

    let body = r#"{
        "title": "2000 Pushups",
        "goal": 0,
        "unit": "pushups",
        "start_date": "2024-02-01",
        "end_date": "2024-02-29",
        "creator_id": "u1"
    }"#;

    let response = app
        .oneshot(json_post("/api/challenges", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_challenge_rejects_empty_title() {
    let (app, _state) = common::create_test_app();

    let body = r#"{
        "title": "   ",
        "goal": 100,
        "unit": "km",
        "start_date": "2024-02-01",
        "end_date": "2024-02-29",
        "creator_id": "u1"
    }"#;

    let response = app
        .oneshot(json_post("/api/challenges", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_challenge_requires_user_id() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/challenges/c1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    // Body fails to deserialize without user_id
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_challenge_offline_db_is_internal_error() {
    let (app, _state) = common::create_test_app();

    // Well-formed request; the challenge lookup hits the mock database
    // before any deletion happens
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/challenges/c1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"user_id": "u1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_log_progress_rejects_non_positive_amount() {
    let (app, _state) = common::create_test_app();

    // Amount is validated before any database access
    let body = r#"{"user_id": "u1", "amount": -5}"#;

    let response = app
        .oneshot(json_post("/api/challenges/c1/logs", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
