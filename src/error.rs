// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Everything above `Signing` is a client-input failure and maps to a 4xx;
/// `Signing`, `Store` and `Internal` are fatal for the request and never
/// leak their details to the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authorization header must be of the form 'Bearer <token>'")]
    MalformedHeader,

    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Token is missing required claims")]
    IncompleteClaims,

    #[error("Unknown identity")]
    UnknownIdentity,

    #[error("Logged out, sign in again")]
    SessionRevoked,

    #[error("{0} is not authorized to visit this route")]
    Forbidden(String),

    #[error("User already exists")]
    DuplicateIdentity,

    #[error("User not found or already logged out")]
    AlreadyLoggedOut,

    #[error("Email not found in provider profile")]
    ProfileIncomplete,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("OAuth provider error: {0}")]
    OAuthProvider(String),

    #[error("Token signing error: {0}")]
    Signing(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable machine-checkable error code.
    ///
    /// `UnknownIdentity` shares the code of `InvalidCredential`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MalformedHeader => "malformed_header",
            AppError::InvalidCredential | AppError::UnknownIdentity => "invalid_credential",
            AppError::IncompleteClaims => "incomplete_claims",
            AppError::SessionRevoked => "session_revoked",
            AppError::Forbidden(_) => "forbidden",
            AppError::DuplicateIdentity => "duplicate_identity",
            AppError::AlreadyLoggedOut => "already_logged_out",
            AppError::ProfileIncomplete => "profile_incomplete",
            AppError::Validation(_) => "validation_failed",
            AppError::NotFound(_) => "not_found",
            AppError::OAuthProvider(_) => "oauth_provider_error",
            AppError::Signing(_) => "signing_error",
            AppError::Store(_) => "store_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedHeader
            | AppError::InvalidCredential
            | AppError::IncompleteClaims
            | AppError::UnknownIdentity
            | AppError::SessionRevoked
            | AppError::ProfileIncomplete
            | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            AppError::DuplicateIdentity => StatusCode::CONFLICT,
            AppError::AlreadyLoggedOut | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::OAuthProvider(_) => StatusCode::BAD_GATEWAY,
            AppError::Signing(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this error is fatal for the request (5xx class).
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Message safe to show to the caller.
    fn public_message(&self) -> String {
        match self {
            AppError::UnknownIdentity => AppError::InvalidCredential.to_string(),
            AppError::Validation(_) => "Validation failed".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::OAuthProvider(_) => "OAuth provider error".to_string(),
            AppError::Signing(_) | AppError::Store(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            AppError::Validation(msg) | AppError::NotFound(msg) => Some(msg.clone()),
            _ => None,
        }
    }
}

/// Report a failed operation to the logging sink.
///
/// Fire-and-forget: only emits a tracing event.
pub fn log_failure(err: &AppError, function_name: &'static str, route: &str) {
    if err.is_server_error() {
        tracing::error!(error = %err, function_name, route, "Request failed");
    } else {
        tracing::warn!(
            error = %err,
            code = err.code(),
            function_name,
            route,
            "Request rejected"
        );
    }
}

/// Attach failure logging to a `Result` without changing it.
pub trait LogFailure {
    fn log_failure(self, function_name: &'static str, route: &str) -> Self;
}

impl<T> LogFailure for std::result::Result<T, AppError> {
    fn log_failure(self, function_name: &'static str, route: &str) -> Self {
        if let Err(err) = &self {
            log_failure(err, function_name, route);
        }
        self
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.public_message(),
            details: self.details(),
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
