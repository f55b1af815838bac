// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Todo-Gate API Server
//!
//! Serves local and Google sign-in, revocable sessions, and a role-gated
//! todo API.

use std::sync::Arc;
use todo_gate::{
    config::{Config, StoreBackend},
    db::{CredentialStore, FirestoreDb, MemoryStore, TodoStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Todo-Gate API");

    let (users, todos): (Arc<dyn CredentialStore>, Arc<dyn TodoStore>) =
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store)
            }
            StoreBackend::Firestore => {
                let db = Arc::new(FirestoreDb::new(&config.gcp_project_id).await?);
                tracing::info!(project = %config.gcp_project_id, "Firestore store initialized");
                (db.clone(), db)
            }
        };

    let port = config.port;
    let state = Arc::new(AppState::new(config, users, todos));

    // Build router
    let app = todo_gate::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("todo_gate=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
