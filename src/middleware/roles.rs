// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-based authorization middleware.
//!
//! Must be layered inside [`require_auth`](super::auth::require_auth): it reads
//! the identity attached there and never decodes the token again.

use crate::error::{log_failure, AppError};
use crate::middleware::auth::AuthUser;
use crate::models::Role;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;

type RoleGateFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Build a middleware that only lets `allowed` roles through.
///
/// ```ignore
/// Router::new()
///     .route("/admin", get(handler))
///     .route_layer(middleware::from_fn(require_roles(&[Role::Admin])))
///     .route_layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub fn require_roles(
    allowed: &'static [Role],
) -> impl Fn(Request, Next) -> RoleGateFuture + Clone + Send + Sync + 'static {
    move |request: Request, next: Next| {
        Box::pin(async move {
            let Some(user) = request.extensions().get::<AuthUser>().cloned() else {
                let err = AppError::Internal(anyhow::anyhow!(
                    "role gate reached without an authenticated identity"
                ));
                log_failure(&err, "require_roles", request.uri().path());
                return err.into_response();
            };

            if !allowed.contains(&user.role) {
                let err = AppError::Forbidden(user.role.to_string());
                log_failure(&err, "require_roles", request.uri().path());
                return err.into_response();
            }

            next.run(request).await
        })
    }
}
