// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token signing and verification (HS256 JWT).
//!
//! Tokens carry no `exp` claim: a token stays valid until the user's
//! revocation field in the credential store is overwritten or cleared.

use crate::error::AppError;
use crate::models::Role;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT claims structure.
///
/// `email` and `role` default to empty so that a verified token missing them
/// can be reported as incomplete rather than malformed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Identity-provider access token (OAuth-derived sessions only)
    #[serde(default, rename = "accessToken", skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
    /// Unique token id; two tokens for the same identity never collide
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    /// Claims for a fresh session.
    pub fn new(email: &str, role: Role) -> Self {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            email: email.to_string(),
            role: Some(role),
            access_token: None,
            iat,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_access_token(mut self, access_token: &str) -> Self {
        self.access_token = Some(access_token.to_string());
        self
    }
}

/// Stateless signer/verifier for session tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: Option<EncodingKey>,
    decoding_key: Option<DecodingKey>,
}

impl TokenCodec {
    /// An empty key leaves the codec unable to sign or verify.
    pub fn new(signing_key: &[u8]) -> Self {
        if signing_key.is_empty() {
            return Self {
                encoding_key: None,
                decoding_key: None,
            };
        }

        Self {
            encoding_key: Some(EncodingKey::from_secret(signing_key)),
            decoding_key: Some(DecodingKey::from_secret(signing_key)),
        }
    }

    /// Sign the claims into a compact token.
    pub fn issue(&self, claims: &Claims) -> Result<String, AppError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or_else(|| AppError::Signing("signing key is not configured".to_string()))?;

        encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|e| AppError::Signing(e.to_string()))
    }

    /// Verify the signature and decode the claims.
    ///
    /// Every failure (bad signature, malformed input, wrong structure) is
    /// reported as `InvalidCredential`.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let key = self.decoding_key.as_ref().ok_or(AppError::InvalidCredential)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        decode::<Claims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token verification failed");
                AppError::InvalidCredential
            })
    }
}
