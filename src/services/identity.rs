// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity resolution for protected requests.
//!
//! A strict linear gate: bearer parsing, signature verification, claim
//! completeness, store lookup, liveness. The first failing step ends the
//! request; there is no retry or refresh.

use crate::db::{bounded, CredentialStore};
use crate::error::AppError;
use crate::models::Role;
use crate::services::token::TokenCodec;
use std::sync::Arc;
use std::time::Duration;

/// Authenticated caller, attached to the request by the identity gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    pub role: Role,
}

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly `Bearer <token>`: one space, two non-empty parts.
pub fn parse_bearer(header: &str) -> Result<&str, AppError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::MalformedHeader),
    }
}

/// Resolves bearer credentials to live identities.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: TokenCodec,
    users: Arc<dyn CredentialStore>,
    store_timeout: Duration,
}

impl IdentityResolver {
    pub fn new(tokens: TokenCodec, users: Arc<dyn CredentialStore>, store_timeout: Duration) -> Self {
        Self {
            tokens,
            users,
            store_timeout,
        }
    }

    /// Resolve a raw `Authorization` header value.
    pub async fn resolve_header(&self, header: Option<&str>) -> Result<AuthUser, AppError> {
        let header = header.ok_or(AppError::MalformedHeader)?;
        self.resolve_token(parse_bearer(header)?).await
    }

    /// Resolve a bare token (as found in the `Authorization` header or cookie).
    pub async fn resolve_token(&self, token: &str) -> Result<AuthUser, AppError> {
        let claims = self.tokens.verify(token)?;

        let role = match claims.role {
            Some(role) if !claims.email.is_empty() => role,
            _ => return Err(AppError::IncompleteClaims),
        };

        let user = bounded(self.store_timeout, self.users.find_by_email(&claims.email))
            .await?
            .ok_or(AppError::UnknownIdentity)?;

        if !user.is_signed_in() {
            return Err(AppError::SessionRevoked);
        }

        Ok(AuthUser {
            email: claims.email,
            role,
        })
    }
}
