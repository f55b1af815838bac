// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.

use crate::error::{log_failure, AppError};
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

pub use crate::services::identity::AuthUser;

/// Name of the session cookie set on sign-in.
pub const TOKEN_COOKIE: &str = "token";

/// Middleware that requires a live session.
///
/// The `Authorization` header is authoritative; the `token` cookie is only
/// consulted when no header was sent. On success the caller's [`AuthUser`]
/// is attached to the request extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let header_value = request.headers().get(header::AUTHORIZATION).map(|h| {
        h.to_str().map_err(|_| AppError::MalformedHeader)
    });

    let resolved = match header_value {
        Some(Ok(value)) => state.identity.resolve_header(Some(value)).await,
        Some(Err(err)) => Err(err),
        None => match jar.get(TOKEN_COOKIE) {
            Some(cookie) if !cookie.value().is_empty() => {
                state.identity.resolve_token(cookie.value()).await
            }
            _ => Err(AppError::MalformedHeader),
        },
    };

    match resolved {
        Ok(auth_user) => {
            request.extensions_mut().insert(auth_user);
            next.run(request).await
        }
        Err(err) => {
            log_failure(&err, "require_auth", request.uri().path());
            err.into_response()
        }
    }
}
