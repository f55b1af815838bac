// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth 2.0 client.
//!
//! Handles:
//! - Building the consent-screen URL
//! - Exchanging the authorization code for tokens
//! - Fetching the userinfo profile

use crate::config::Config;
use crate::error::AppError;
use crate::services::oauth::OAuthProfile;
use serde::Deserialize;
use std::time::Duration;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_url: config.google_redirect_url.clone(),
        }
    }

    /// Consent-screen URL carrying the signed `state`.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             state={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode("openid email profile"),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokens, AppError> {
        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::OAuthProvider(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::OAuthProvider(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::OAuthProvider(format!("Failed to parse token response: {}", e)))
    }

    /// Fetch the signed-in user's profile.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<OAuthProfile, AppError> {
        let response = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::OAuthProvider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::OAuthProvider(format!(
                "Userinfo request failed with status {}",
                status
            )));
        }

        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| AppError::OAuthProvider(format!("JSON parse error: {}", e)))?;

        Ok(info.into())
    }
}

/// Token response from Google's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// OpenID Connect userinfo payload.
#[derive(Debug, Clone, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<GoogleUserInfo> for OAuthProfile {
    /// Unverified addresses are dropped, so they can never name an account.
    fn from(info: GoogleUserInfo) -> Self {
        let verified = info.email_verified == Some(true);
        if info.email.is_some() && !verified {
            tracing::warn!(sub = %info.sub, "Ignoring unverified Google email");
        }

        OAuthProfile {
            display_name: info.name.unwrap_or_default(),
            emails: info.email.filter(|_| verified).into_iter().collect(),
            photos: info.picture.into_iter().collect(),
            id: info.sub,
        }
    }
}
