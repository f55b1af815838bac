// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential lifecycle: sign-up, sign-in, logout.
//!
//! Each successful sign-up or sign-in overwrites the user's revocation field
//! with the new token; logout clears it.

use crate::db::{bounded, CredentialStore};
use crate::error::AppError;
use crate::models::{NewUser, Role};
use crate::services::password::{hash_password_blocking, verify_password_blocking};
use crate::services::token::{Claims, TokenCodec};
use std::sync::Arc;
use std::time::Duration;

/// Local (email/password) account operations.
#[derive(Clone)]
pub struct AccountService {
    tokens: TokenCodec,
    users: Arc<dyn CredentialStore>,
    store_timeout: Duration,
}

impl AccountService {
    pub fn new(tokens: TokenCodec, users: Arc<dyn CredentialStore>, store_timeout: Duration) -> Self {
        Self {
            tokens,
            users,
            store_timeout,
        }
    }

    /// Create a local account and return its first session token.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<String, AppError> {
        if bounded(self.store_timeout, self.users.find_by_email(email))
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateIdentity);
        }

        let token = self.tokens.issue(&Claims::new(email, Role::User))?;
        let password_hash = hash_password_blocking(password.to_string()).await?;

        let user = bounded(
            self.store_timeout,
            self.users.create(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password_hash: Some(password_hash),
                external_provider_id: None,
                avatar_url: None,
                role: Role::User,
                revocation_token: token.clone(),
            }),
        )
        .await?;

        tracing::info!(user_id = %user.id, "Created new user");
        Ok(token)
    }

    /// Check the password and start a new session, replacing any previous one.
    pub async fn signin(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = bounded(self.store_timeout, self.users.find_by_email(email))
            .await?
            .ok_or(AppError::UnknownIdentity)?;

        let Some(password_hash) = user.password_hash.clone() else {
            tracing::debug!(user_id = %user.id, "Password sign-in attempted on OAuth-only account");
            return Err(AppError::InvalidCredential);
        };

        if !verify_password_blocking(password.to_string(), password_hash).await? {
            return Err(AppError::InvalidCredential);
        }

        let token = self.tokens.issue(&Claims::new(&user.email, user.role))?;

        let updated = bounded(
            self.store_timeout,
            self.users.update_revocation_token(&user.email, &token),
        )
        .await?;
        if updated == 0 {
            return Err(AppError::Store(
                "session token was not recorded".to_string(),
            ));
        }

        tracing::info!(user_id = %user.id, "Sign-in successful");
        Ok(token)
    }

    /// End the session of an already-resolved identity.
    ///
    /// `AlreadyLoggedOut` when there was nothing to clear.
    pub async fn logout(&self, email: &str) -> Result<(), AppError> {
        let updated = bounded(
            self.store_timeout,
            self.users.update_revocation_token(email, ""),
        )
        .await?;

        if updated == 0 {
            return Err(AppError::AlreadyLoggedOut);
        }
        Ok(())
    }
}
