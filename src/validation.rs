//! Request validation shared by all handlers.
//!
//! Bodies and query strings are deserialized with axum's own extractors and
//! then checked by the DTO's [`Validate`] impl. Any failure, including a
//! rejection from axum itself, becomes a [`ValidationError`] naming the first
//! field that failed.

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn from_json_rejection(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => {
                let text = e.body_text();
                let detail = text
                    .strip_prefix("Failed to deserialize the JSON body into the target type: ")
                    .unwrap_or(&text);
                match split_field(detail) {
                    Some((field, message)) => Self::new(field, message),
                    None => Self::new("body", detail),
                }
            }
            other => Self::new("body", other.body_text()),
        }
    }

    fn from_query_rejection(rejection: QueryRejection) -> Self {
        let text = rejection.body_text();
        let detail = text
            .strip_prefix("Failed to deserialize query string: ")
            .unwrap_or(&text);
        match split_field(detail) {
            Some((field, message)) => Self::new(field, message),
            None => Self::new("query", detail),
        }
    }
}

/// Splits `"respect_diet: invalid type ..."` into its field path and message.
fn split_field(detail: &str) -> Option<(&str, &str)> {
    let (head, rest) = detail.split_once(": ")?;
    if head.is_empty() || head == "." || head.contains(char::is_whitespace) {
        return None;
    }
    Some((head, rest))
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub(crate) fn require<'a, T>(field: &str, value: Option<&'a T>) -> Result<&'a T, ValidationError> {
    value.ok_or_else(|| ValidationError::new(field, "is required"))
}

pub(crate) fn non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn meal_date(field: &str, value: &str) -> Result<(), ValidationError> {
    non_empty(field, value)?;
    if is_valid_date(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            "must be an RFC 3339 timestamp or a YYYY-MM-DD date",
        ))
    }
}

pub(crate) fn is_valid_date(value: &str) -> bool {
    OffsetDateTime::parse(value, &Rfc3339).is_ok()
        || Date::parse(value, format_description!("[year]-[month]-[day]")).is_ok()
}

/// JSON body that has passed [`Validate`].
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidationError::from_json_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string that has passed [`Validate`].
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(ValidationError::from_query_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_timestamps_and_calendar_dates() {
        assert!(is_valid_date("2024-03-01T12:30:00.000Z"));
        assert!(is_valid_date("2024-03-01T12:30:00+02:00"));
        assert!(is_valid_date("2024-03-01"));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert!(!is_valid_date("yesterday"));
        assert!(!is_valid_date("2024-13-01"));
        assert_eq!(
            meal_date("date", "  ").unwrap_err(),
            ValidationError::new("date", "must not be empty")
        );
    }

    #[test]
    fn split_field_finds_leading_path() {
        assert_eq!(
            split_field("respect_diet: invalid type: string \"x\", expected a boolean"),
            Some(("respect_diet", "invalid type: string \"x\", expected a boolean"))
        );
        assert_eq!(split_field("missing field `name` at line 1"), None);
        assert_eq!(split_field(".: missing field `name`"), None);
    }

    #[test]
    fn require_reports_missing_field() {
        let missing: Option<&String> = None;
        let err = require("name", missing).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "is required");
    }
}
