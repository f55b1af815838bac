// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token compatibility tests.
//!
//! These tests pin the wire format of session tokens so that tokens issued by
//! older builds (or other services sharing the key) keep decoding.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use todo_gate::models::Role;
use todo_gate::services::{Claims, TokenCodec};

const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

#[test]
fn test_minimal_foreign_token_decodes() {
    // Only email and role, no iat/jti/exp.
    let token = encode(
        &Header::new(Algorithm::HS256),
        &json!({"email": "a@x.com", "role": "USER"}),
        &EncodingKey::from_secret(KEY),
    )
    .unwrap();

    let claims = TokenCodec::new(KEY).verify(&token).unwrap();
    assert_eq!(claims.email, "a@x.com");
    assert_eq!(claims.role, Some(Role::User));
    assert!(claims.access_token.is_none());
}

#[test]
fn test_access_token_claim_name() {
    let codec = TokenCodec::new(KEY);
    let token = codec
        .issue(&Claims::new("a@x.com", Role::User).with_access_token("abc"))
        .unwrap();

    let payload = token.split('.').nth(1).unwrap();
    let decoded: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();

    assert_eq!(decoded["accessToken"], "abc");
    assert_eq!(decoded["role"], "USER");
    assert!(decoded.get("exp").is_none());
}
