//! User model for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization role carried in tokens and stored on the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Parse a role name (case-insensitive).
    pub fn parse(s: &str) -> Option<Role> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User record owned by the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Unique, primary lookup key
    pub email: String,
    /// Argon2id PHC string; absent for OAuth-only accounts
    #[serde(default)]
    pub password_hash: Option<String>,
    /// Identity-provider subject linking an OAuth account
    #[serde(default)]
    pub external_provider_id: Option<String>,
    /// Profile picture URL
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Role,
    /// Currently valid session token; empty means logged out
    #[serde(default)]
    pub revocation_token: String,
    /// When the account was created (RFC 3339)
    pub created_at: String,
}

impl User {
    /// Whether the user has a live session.
    pub fn is_signed_in(&self) -> bool {
        !self.revocation_token.is_empty()
    }
}

/// Fields supplied when creating a user; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub external_provider_id: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub revocation_token: String,
}

impl NewUser {
    /// Materialize the record with store-assigned fields.
    pub fn into_user(self, id: String) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            external_provider_id: self.external_provider_id,
            avatar_url: self.avatar_url,
            role: self.role,
            revocation_token: self.revocation_token,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" USER "), Some(Role::User));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
        assert_eq!(Role::default(), Role::User);
    }
}
