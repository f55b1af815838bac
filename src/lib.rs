// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Todo-Gate: authenticated todo list backend
//!
//! This crate provides email/password and Google OAuth sign-in, a revocable
//! session-token scheme, and a role-gated todo API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{CredentialStore, TodoStore};
use services::{
    AccountService, GoogleClient, IdentityResolver, OAuthLinker, TodoCache, TokenCodec,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn CredentialStore>,
    pub todos: Arc<dyn TodoStore>,
    pub tokens: TokenCodec,
    pub identity: IdentityResolver,
    pub accounts: AccountService,
    pub oauth: OAuthLinker,
    pub google: GoogleClient,
    pub todo_cache: TodoCache,
}

impl AppState {
    /// Wire the services on top of the given stores.
    pub fn new(
        config: Config,
        users: Arc<dyn CredentialStore>,
        todos: Arc<dyn TodoStore>,
    ) -> Self {
        let tokens = TokenCodec::new(&config.jwt_signing_key);
        let timeout = config.store_timeout;

        Self {
            identity: IdentityResolver::new(tokens.clone(), users.clone(), timeout),
            accounts: AccountService::new(tokens.clone(), users.clone(), timeout),
            oauth: OAuthLinker::new(
                tokens.clone(),
                users.clone(),
                timeout,
                config.oauth_default_role,
            ),
            google: GoogleClient::new(&config),
            todo_cache: TodoCache::new(),
            tokens,
            users,
            todos,
            config,
        }
    }
}
