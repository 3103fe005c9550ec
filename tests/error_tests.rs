// SPDX-License-Identifier: MIT

//! Error-to-HTTP mapping tests.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use spurt_api::error::AppError;

#[test]
fn test_not_connected_is_bad_request() {
    let response = AppError::NotConnected.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_exchange_failed_is_bad_request() {
    let response = AppError::ExchangeFailed("invalid code".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_refresh_failed_is_bad_gateway() {
    let response = AppError::RefreshFailed("invalid grant".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn test_timeout_is_gateway_timeout() {
    let response = AppError::Timeout.into_response();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[test]
fn test_not_found_maps_to_404() {
    let response = AppError::NotFound("Challenge c1".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_forbidden_maps_to_403() {
    let response =
        AppError::Forbidden("Only the creator can delete a challenge".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[test]
fn test_database_error_is_internal() {
    let response = AppError::Database("connection refused".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_error_body_shape() {
    let response = AppError::BadRequest("Missing parameters".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["error"], "bad_request");
    assert_eq!(body["details"], "Missing parameters");
}
