// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth account linking: reconcile a provider profile with a local user.

use crate::db::{bounded, CredentialStore};
use crate::error::AppError;
use crate::models::{NewUser, Role, User};
use crate::services::token::{Claims, TokenCodec};
use std::sync::Arc;
use std::time::Duration;

/// Identity-provider profile, normalized from the provider's userinfo payload.
#[derive(Debug, Clone, Default)]
pub struct OAuthProfile {
    /// Provider subject id
    pub id: String,
    pub display_name: String,
    pub emails: Vec<String>,
    pub photos: Vec<String>,
}

impl OAuthProfile {
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .first()
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }
}

/// Find-or-create of local users from provider profiles.
#[derive(Clone)]
pub struct OAuthLinker {
    tokens: TokenCodec,
    users: Arc<dyn CredentialStore>,
    store_timeout: Duration,
    default_role: Role,
}

impl OAuthLinker {
    /// `default_role` is given to accounts created through OAuth.
    pub fn new(
        tokens: TokenCodec,
        users: Arc<dyn CredentialStore>,
        store_timeout: Duration,
        default_role: Role,
    ) -> Self {
        Self {
            tokens,
            users,
            store_timeout,
            default_role,
        }
    }

    /// Link the profile to a local user and start a session for it.
    ///
    /// The returned user carries the freshly issued token in
    /// `revocation_token`. Existing users only get their token replaced, and
    /// that token names the stored email, whatever the provider now reports.
    pub async fn link(&self, access_token: &str, profile: &OAuthProfile) -> Result<User, AppError> {
        let existing = bounded(self.store_timeout, self.users.find_by_external_id(&profile.id)).await?;

        let email = profile.primary_email().ok_or(AppError::ProfileIncomplete)?;

        match existing {
            None => {
                let role = self.default_role;
                let token = self
                    .tokens
                    .issue(&Claims::new(email, role).with_access_token(access_token))?;

                let user = bounded(
                    self.store_timeout,
                    self.users.create(NewUser {
                        name: profile.display_name.clone(),
                        email: email.to_string(),
                        password_hash: None,
                        external_provider_id: Some(profile.id.clone()),
                        avatar_url: profile.photos.first().cloned(),
                        role,
                        revocation_token: token,
                    }),
                )
                .await?;

                tracing::info!(user_id = %user.id, "Created user from OAuth profile");
                Ok(user)
            }
            Some(mut user) => {
                if user.email != email {
                    tracing::warn!(
                        user_id = %user.id,
                        "Provider email differs from stored email; keeping stored email"
                    );
                }

                let token = self
                    .tokens
                    .issue(&Claims::new(&user.email, user.role).with_access_token(access_token))?;

                let rows = bounded(
                    self.store_timeout,
                    self.users
                        .update_revocation_token_by_external_id(&profile.id, &token),
                )
                .await?;
                if rows == 0 {
                    return Err(AppError::Store(format!(
                        "session token for user {} was not recorded",
                        user.id
                    )));
                }
                user.revocation_token = token;

                tracing::info!(user_id = %user.id, "Refreshed session for OAuth user");
                Ok(user)
            }
        }
    }

    /// Adapter for callback-style strategy frameworks: reports the outcome
    /// through `done(error, user)`.
    pub async fn link_with_callback<F>(&self, access_token: &str, profile: &OAuthProfile, done: F)
    where
        F: FnOnce(Option<AppError>, Option<User>),
    {
        match self.link(access_token, profile).await {
            Ok(user) => done(None, Some(user)),
            Err(err) => done(Some(err), None),
        }
    }
}
