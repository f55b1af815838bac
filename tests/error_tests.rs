// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use todo_gate::error::AppError;

mod common;

#[test]
fn test_client_errors_are_4xx() {
    let cases = [
        (AppError::MalformedHeader, StatusCode::BAD_REQUEST),
        (AppError::InvalidCredential, StatusCode::BAD_REQUEST),
        (AppError::IncompleteClaims, StatusCode::BAD_REQUEST),
        (AppError::UnknownIdentity, StatusCode::BAD_REQUEST),
        (AppError::SessionRevoked, StatusCode::BAD_REQUEST),
        (AppError::Forbidden("USER".to_string()), StatusCode::UNAUTHORIZED),
        (AppError::DuplicateIdentity, StatusCode::CONFLICT),
        (AppError::AlreadyLoggedOut, StatusCode::NOT_FOUND),
        (AppError::ProfileIncomplete, StatusCode::BAD_REQUEST),
    ];

    for (err, status) in cases {
        assert_eq!(err.status(), status, "{err:?}");
        assert!(!err.is_server_error());
    }
}

#[test]
fn test_fatal_errors_are_5xx() {
    assert!(AppError::Signing("no key".to_string()).is_server_error());
    assert!(AppError::Store("timeout".to_string()).is_server_error());
    assert!(AppError::Internal(anyhow::anyhow!("boom")).is_server_error());
}

#[test]
fn test_unknown_identity_shares_invalid_credential_code() {
    assert_eq!(AppError::UnknownIdentity.code(), AppError::InvalidCredential.code());
}

#[tokio::test]
async fn test_store_error_hides_details() {
    let response = AppError::Store("connection refused to 10.0.0.3".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "store_error");
    assert_eq!(body["message"], "Internal server error");
    assert!(!body.to_string().contains("10.0.0.3"));
}

#[tokio::test]
async fn test_forbidden_names_role() {
    let body = common::body_json(AppError::Forbidden("USER".to_string()).into_response()).await;
    assert_eq!(body["message"], "USER is not authorized to visit this route");
}
