// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth cookie attribute tests.
//!
//! These tests verify the `token` cookie set on sign-in and its removal on
//! logout for localhost and production-style frontends.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use todo_gate::config::Config;
use todo_gate::models::Role;
use tower::ServiceExt;

mod common;

fn find_cookie(headers: &[String], name: &str) -> String {
    headers
        .iter()
        .find(|value| value.starts_with(&format!("{name}=")))
        .cloned()
        .unwrap_or_else(|| panic!("missing Set-Cookie header for {name}: {headers:?}"))
}

#[tokio::test]
async fn test_signup_sets_token_cookie_localhost() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(common::request(
            "POST",
            "/auth/sign-up",
            None,
            Some(json!({"name": "Ann", "email": "a@x.com", "password": "p"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = find_cookie(&common::set_cookie_headers(&response), "token");
    let token = common::body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    assert!(cookie.starts_with(&format!("token={token}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=3600"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_signin_cookie_secure_for_https_frontend() {
    let config = Config {
        frontend_url: "https://todo.example.com".to_string(),
        session_cookie_max_age_secs: 600,
        ..Config::default()
    };
    let (app, state, store) = common::create_test_app_with_config(config);
    common::seed_user(&state, &store, "a@x.com", Role::User).await;

    let response = app
        .oneshot(common::request(
            "POST",
            "/auth/sign-in",
            None,
            Some(json!({"email": "a@x.com", "password": "password"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = find_cookie(&common::set_cookie_headers(&response), "token");
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("Max-Age=600"));
}

#[tokio::test]
async fn test_logout_removes_cookie() {
    let (app, state, store) = common::create_test_app();
    let token = common::seed_user(&state, &store, "a@x.com", Role::User).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/logout")
                .header(header::COOKIE, format!("token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = find_cookie(&common::set_cookie_headers(&response), "token");
    assert!(cookie.starts_with("token=;"));
    assert!(cookie.contains("Max-Age=0"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_failed_signin_sets_no_cookie() {
    let (app, state, store) = common::create_test_app();
    common::seed_user(&state, &store, "a@x.com", Role::User).await;

    let response = app
        .oneshot(common::request(
            "POST",
            "/auth/sign-in",
            None,
            Some(json!({"email": "a@x.com", "password": "nope"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(common::set_cookie_headers(&response).is_empty());
}
