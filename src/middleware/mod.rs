// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, authorization, validation).

pub mod auth;
pub mod roles;
pub mod validate;

pub use auth::{require_auth, AuthUser};
pub use roles::require_roles;
pub use validate::ValidatedJson;
