// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payload validation: JSON body extraction followed by `validator` rules.

use crate::error::{AppError, LogFailure};
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// JSON body that has passed its `Validate` rules.
///
/// Rejections are `AppError::Validation`, so handlers never see a payload of
/// the wrong shape.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let route = req.uri().path().to_string();

        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))
            .log_failure("validate_payload", &route)?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(first_message(&errors)))
            .log_failure("validate_payload", &route)?;

        Ok(ValidatedJson(value))
    }
}

/// Human-readable description of the first failing rule.
pub fn first_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    for (field, kind) in fields {
        match kind {
            ValidationErrorsKind::Field(errs) => {
                if let Some(err) = errs.first() {
                    return match &err.message {
                        Some(message) => message.to_string(),
                        None if *field == "__all__" => err.code.to_string(),
                        None => format!("{} is invalid ({})", field, err.code),
                    };
                }
            }
            ValidationErrorsKind::Struct(inner) => return first_message(inner),
            ValidationErrorsKind::List(items) => {
                if let Some(inner) = items.values().next() {
                    return first_message(inner);
                }
            }
        }
    }

    "invalid payload".to_string()
}

/// Parse a todo id path segment.
pub fn parse_id(raw: &str) -> Result<u64, AppError> {
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Validation(format!(
            "id must be a positive integer, got '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, max = 25, message = "name must be 3-25 characters"))]
        name: String,
        #[validate(email(message = "email must be a valid email address"))]
        email: String,
    }

    async fn extract(body: &'static str) -> Result<Payload, AppError> {
        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        ValidatedJson::<Payload>::from_request(req, &())
            .await
            .map(|ValidatedJson(p)| p)
    }

    #[tokio::test]
    async fn test_valid_payload_passes() {
        let payload = extract(r#"{"name":"Ann","email":"a@x.com"}"#).await.unwrap();
        assert_eq!(payload.name, "Ann");
    }

    #[tokio::test]
    async fn test_rule_violation_reports_message() {
        let err = extract(r#"{"name":"An","email":"a@x.com"}"#)
            .await
            .unwrap_err();
        match err {
            AppError::Validation(msg) => assert_eq!(msg, "name must be 3-25 characters"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_field_is_validation_error() {
        let err = extract(r#"{"name":"Ann"}"#).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let err = extract("{not json").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("0"), Err(AppError::Validation(_))));
        assert!(matches!(parse_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_id("-1"), Err(AppError::Validation(_))));
    }
}
