// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication routes: local sign-up/sign-in, Google OAuth, logout.

use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, LogFailure, Result};
use crate::middleware::auth::{AuthUser, TOKEN_COOKIE};
use crate::middleware::validate::ValidatedJson;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// How long a signed OAuth `state` stays acceptable.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

/// Public auth routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/google", get(google_start))
        .route("/auth/google-redirect", get(google_callback))
}

/// Auth routes that need an identity (mounted behind `require_auth`).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/logout", post(logout))
}

// ─── Payloads ────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 25, message = "name must be 3-25 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "password must be 1-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "password must be 1-128 characters"))]
    pub password: String,
}

/// Response carrying a fresh session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// ─── Session cookie ──────────────────────────────────────────

fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .max_age(time::Duration::seconds(config.session_cookie_max_age_secs))
        .build()
}

fn session_cookie_removal(config: &Config) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies())
        .build()
}

// ─── Local accounts ──────────────────────────────────────────

/// Create an account and start its first session.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    uri: Uri,
    ValidatedJson(body): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<TokenResponse>)> {
    let token = state
        .accounts
        .signup(&body.name, &body.email, &body.password)
        .await
        .log_failure("sign_up", uri.path())?;

    Ok((
        StatusCode::CREATED,
        jar.add(session_cookie(&state.config, token.clone())),
        Json(TokenResponse {
            message: "User created successfully".to_string(),
            token,
        }),
    ))
}

/// Check credentials and start a new session.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    uri: Uri,
    ValidatedJson(body): ValidatedJson<SigninRequest>,
) -> Result<(CookieJar, Json<TokenResponse>)> {
    let token = state
        .accounts
        .signin(&body.email, &body.password)
        .await
        .log_failure("sign_in", uri.path())?;

    Ok((
        jar.add(session_cookie(&state.config, token.clone())),
        Json(TokenResponse {
            message: "Signin successful".to_string(),
            token,
        }),
    ))
}

/// End the caller's session.
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    uri: Uri,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    state
        .accounts
        .logout(&user.email)
        .await
        .log_failure("logout", uri.path())?;

    tracing::info!(email = %user.email, "User logged out");

    Ok((
        jar.remove(session_cookie_removal(&state.config)),
        Json(MessageResponse {
            message: "Logout successful".to_string(),
        }),
    ))
}

// ─── Google OAuth ────────────────────────────────────────────

fn now_millis() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Start OAuth flow - redirect to Google's consent screen.
async fn google_start(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    let oauth_state = sign_state(&state.config.oauth_state_key, &nonce, now_millis()?)?;

    tracing::info!("Starting OAuth flow, redirecting to Google");

    Ok(Redirect::temporary(
        &state.google.authorize_url(&oauth_state),
    ))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code, link the profile, start a session.
async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    uri: Uri,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Json<TokenResponse>)> {
    let user = complete_google_login(&state, params)
        .await
        .log_failure("google_callback", uri.path())?;

    let token = user.revocation_token;
    Ok((
        jar.add(session_cookie(&state.config, token.clone())),
        Json(TokenResponse {
            message: "Google authentication successful".to_string(),
            token,
        }),
    ))
}

async fn complete_google_login(
    state: &AppState,
    params: CallbackParams,
) -> Result<crate::models::User> {
    if let Some(error) = params.error {
        return Err(AppError::OAuthProvider(format!(
            "authorization failed: {}",
            error
        )));
    }

    let oauth_state = params
        .state
        .ok_or_else(|| AppError::Validation("missing state parameter".to_string()))?;
    if verify_state(&oauth_state, &state.config.oauth_state_key, now_millis()?).is_none() {
        return Err(AppError::Validation(
            "invalid or expired state parameter".to_string(),
        ));
    }

    let code = params
        .code
        .ok_or_else(|| AppError::Validation("missing code parameter".to_string()))?;

    tracing::info!("Exchanging authorization code for tokens");
    let tokens = state.google.exchange_code(&code).await?;
    let profile = state.google.fetch_profile(&tokens.access_token).await?;

    state.oauth.link(&tokens.access_token, &profile).await
}

/// Sign `nonce|timestamp_hex` and base64-encode it for the URL.
fn sign_state(secret: &[u8], nonce: &str, timestamp_ms: u128) -> Result<String> {
    let payload = format!("{}|{:x}", nonce, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Verify the HMAC signature and age of an OAuth `state`; returns the nonce.
fn verify_state(state: &str, secret: &[u8], now_ms: u128) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "nonce|timestamp_hex|signature_hex"
    let parts: Vec<&str> = state_str.splitn(3, '|').collect();
    if parts.len() != 3 {
        return None;
    }

    let nonce = parts[0];
    let timestamp_hex = parts[1];
    let signature_hex = parts[2];

    let payload = format!("{}|{}", nonce, timestamp_hex);
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if !bool::from(expected_signature.as_bytes().ct_eq(signature_hex.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_at = u128::from_str_radix(timestamp_hex, 16).ok()?;
    if now_ms.saturating_sub(issued_at) > STATE_MAX_AGE_MS {
        tracing::warn!("OAuth state expired");
        return None;
    }

    Some(nonce.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u128 = 1_700_000_000_000;

    #[test]
    fn test_verify_state_success() {
        let secret = b"secret_key";
        let encoded_state = sign_state(secret, "abc123", NOW).unwrap();

        let result = verify_state(&encoded_state, secret, NOW + 1000);
        assert_eq!(result, Some("abc123".to_string()));
    }

    #[test]
    fn test_verify_state_invalid_signature() {
        let secret = b"secret_key";
        let payload = format!("{}|{:x}", "abc123", NOW);
        let state_data = format!("{}|{}", payload, "invalid_signature");
        let encoded_state = URL_SAFE_NO_PAD.encode(state_data.as_bytes());

        assert_eq!(verify_state(&encoded_state, secret, NOW), None);
    }

    #[test]
    fn test_verify_state_wrong_secret() {
        let encoded_state = sign_state(b"secret_key", "abc123", NOW).unwrap();
        assert_eq!(verify_state(&encoded_state, b"wrong_key", NOW), None);
    }

    #[test]
    fn test_verify_state_expired() {
        let secret = b"secret_key";
        let encoded_state = sign_state(secret, "abc123", NOW).unwrap();

        assert_eq!(
            verify_state(&encoded_state, secret, NOW + STATE_MAX_AGE_MS + 1),
            None
        );
    }

    #[test]
    fn test_verify_state_malformed() {
        let secret = b"secret_key";
        let encoded_state = URL_SAFE_NO_PAD.encode("invalid|format");
        assert_eq!(verify_state(&encoded_state, secret, NOW), None);
        assert_eq!(verify_state("%%%not-base64", secret, NOW), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie(&Config::default(), "tok".to_string()).to_string();

        assert!(cookie.starts_with("token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Secure"));
    }
}
