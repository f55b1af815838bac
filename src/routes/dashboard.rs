// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard route for signed-in users.

use crate::middleware::auth::{AuthUser, TOKEN_COOKIE};
use crate::models::Role;
use crate::AppState;
use axum::{routing::get, Extension, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(dashboard))
}

/// Current caller, plus the session cookie if the browser sent one.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub message: String,
    pub email: String,
    pub role: Role,
    pub token: Option<String>,
}

async fn dashboard(
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        message: format!("Welcome to the dashboard, {}", user.email),
        email: user.email,
        role: user.role,
        token: jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()),
    })
}
