// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
};
use std::sync::Arc;
use todo_gate::config::Config;
use todo_gate::db::{CredentialStore, MemoryStore};
use todo_gate::models::{NewUser, Role, User};
use todo_gate::routes::create_router;
use todo_gate::services::password::hash_password;
use todo_gate::services::Claims;
use todo_gate::AppState;

/// Create a test app backed by the in-memory store.
/// Returns the router, the shared state and the store.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    create_test_app_with_config(Config::default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config, store.clone(), store.clone()));

    (create_router(state.clone()), state, store)
}

/// Insert a signed-in user directly into the store and return its token.
#[allow(dead_code)]
pub async fn seed_user(state: &AppState, store: &MemoryStore, email: &str, role: Role) -> String {
    let token = state.tokens.issue(&Claims::new(email, role)).unwrap();
    CredentialStore::create(
        store,
        NewUser {
            name: "Seeded".to_string(),
            email: email.to_string(),
            password_hash: Some(hash_password("password").unwrap()),
            external_provider_id: None,
            avatar_url: None,
            role,
            revocation_token: token.clone(),
        },
    )
    .await
    .unwrap();
    token
}

#[allow(dead_code)]
pub async fn find_user(store: &MemoryStore, email: &str) -> Option<User> {
    store.find_by_email(email).await.unwrap()
}

/// Build a request with an optional JSON body and bearer token.
#[allow(dead_code)]
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub fn set_cookie_headers(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a Firestore connection to the emulator.
#[allow(dead_code)]
pub async fn test_db() -> todo_gate::db::FirestoreDb {
    todo_gate::db::FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}
