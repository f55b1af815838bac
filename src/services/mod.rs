// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod google;
pub mod identity;
pub mod oauth;
pub mod password;
pub mod todo_cache;
pub mod token;

pub use accounts::AccountService;
pub use google::GoogleClient;
pub use identity::{AuthUser, IdentityResolver};
pub use oauth::{OAuthLinker, OAuthProfile};
pub use todo_cache::TodoCache;
pub use token::{Claims, TokenCodec};
