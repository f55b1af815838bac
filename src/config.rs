//! Application configuration loaded from environment variables.
//!
//! Read once at startup; a `.env` file is honored for local development.

use crate::models::Role;
use std::env;
use std::time::Duration;

/// Which persistence engine backs the credential and todo stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Firestore,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL (CORS origin, cookie `Secure` decision)
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Where Google sends the user back after consent
    pub google_redirect_url: String,
    /// Role given to accounts created through OAuth
    pub oauth_default_role: Role,
    /// Persistence engine
    pub store_backend: StoreBackend,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Upper bound for a single store call
    pub store_timeout: Duration,
    /// Max-Age of the `token` cookie
    pub session_cookie_max_age_secs: i64,

    // --- Secrets ---
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            google_client_id: "test_client_id".to_string(),
            google_redirect_url: "http://localhost:8080/auth/google-redirect".to_string(),
            oauth_default_role: Role::User,
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            store_timeout: Duration::from_secs(5),
            session_cookie_max_age_secs: 60 * 60,
            google_client_secret: "test_secret".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_signing_key = var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .ok_or(ConfigError::Missing("JWT_SIGNING_KEY"))?
            .into_bytes();
        let oauth_state_key = var("OAUTH_STATE_KEY")
            .map(|v| v.trim().as_bytes().to_vec())
            .unwrap_or_else(|| jwt_signing_key.clone());

        let port = var("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        let oauth_default_role = match var("OAUTH_DEFAULT_ROLE") {
            Some(raw) => Role::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "OAUTH_DEFAULT_ROLE",
                value: raw,
            })?,
            None => Role::User,
        };

        let store_backend = match var("STORE_BACKEND").as_deref() {
            Some("firestore") => StoreBackend::Firestore,
            Some("memory") | None => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let store_timeout_ms = var("STORE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000);

        Ok(Self {
            frontend_url: var("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            port,
            google_client_id: var("GOOGLE_CLIENT_ID").unwrap_or_default(),
            google_redirect_url: var("GOOGLE_REDIRECT_URL").unwrap_or_else(|| {
                format!("http://localhost:{}/auth/google-redirect", port)
            }),
            oauth_default_role,
            store_backend,
            gcp_project_id: var("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            store_timeout: Duration::from_millis(store_timeout_ms),
            session_cookie_max_age_secs: var("SESSION_COOKIE_MAX_AGE_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60 * 60),
            google_client_secret: var("GOOGLE_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            jwt_signing_key,
            oauth_state_key,
        })
    }

    /// Whether cookies should carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.frontend_url.starts_with("https://")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SIGNING_KEY", " test_jwt_key_32_bytes_minimum!! "),
            ("OAUTH_DEFAULT_ROLE", "admin"),
            ("PORT", "9000"),
        ]))
        .expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.oauth_state_key, config.jwt_signing_key);
        assert_eq!(config.oauth_default_role, Role::Admin);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.google_redirect_url,
            "http://localhost:9000/auth/google-redirect"
        );
        assert_eq!(config.store_timeout, Duration::from_millis(5000));
    }

    #[test]
    fn test_config_requires_signing_key() {
        let result = Config::from_lookup(lookup(&[("OAUTH_DEFAULT_ROLE", "user")]));
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SIGNING_KEY"))));
    }

    #[test]
    fn test_config_rejects_unknown_values() {
        let result = Config::from_lookup(lookup(&[
            ("JWT_SIGNING_KEY", "k"),
            ("OAUTH_DEFAULT_ROLE", "owner"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "OAUTH_DEFAULT_ROLE", .. })
        ));

        let result = Config::from_lookup(lookup(&[
            ("JWT_SIGNING_KEY", "k"),
            ("STORE_BACKEND", "postgres"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "STORE_BACKEND", .. })
        ));
    }

    #[test]
    fn test_secure_cookies_follow_frontend_scheme() {
        let mut config = Config::default();
        assert!(!config.secure_cookies());

        config.frontend_url = "https://todo.example.com".to_string();
        assert!(config.secure_cookies());
    }
}
