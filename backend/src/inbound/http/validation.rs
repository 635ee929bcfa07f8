//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies carry stringly-typed ids, timestamps and enum values so
//! that a malformed field produces this adapter's `{field, code}` error
//! envelope instead of a framework deserialization error.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::{Error, IdParseError};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(
    field: FieldName,
    message: String,
    code: ErrorCode,
    value: &str,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

/// Surface a domain validation failure against a named request field.
pub(crate) fn invalid_field_error(field: FieldName, message: impl std::fmt::Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::InvalidValue.as_str(),
    }))
}

/// Parse an entity id from its string form.
pub(crate) fn parse_id<T>(
    raw: &str,
    field: FieldName,
    parse: impl FnOnce(&str) -> Result<T, IdParseError>,
) -> Result<T, Error> {
    parse(raw).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            raw,
        )
    })
}

/// Parse a list of entity ids, reporting the offending index.
pub(crate) fn parse_id_list<T>(
    values: Vec<String>,
    field: FieldName,
    parse: impl Fn(&str) -> Result<T, IdParseError>,
) -> Result<Vec<T>, Error> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            parse(&value).map_err(|_| {
                Error::invalid_request(format!(
                    "{} must contain valid UUIDs",
                    field.as_str()
                ))
                .with_details(json!({
                    "field": field.as_str(),
                    "index": index,
                    "value": value,
                    "code": ErrorCode::InvalidUuid.as_str(),
                }))
            })
        })
        .collect()
}

pub(crate) fn parse_rfc3339_timestamp(
    value: &str,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_error(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                ErrorCode::InvalidTimestamp,
                value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(&raw, field))
        .transpose()
}

/// Parse a closed-vocabulary value (statuses, priorities, actions).
pub(crate) fn parse_enum<T: FromStr>(value: &str, field: FieldName) -> Result<T, Error> {
    value.parse::<T>().map_err(|_| {
        field_error(
            field,
            format!("{} is not a recognised value", field.as_str()),
            ErrorCode::InvalidValue,
            value,
        )
    })
}

pub(crate) fn parse_optional_enum<T: FromStr>(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<T>, Error> {
    value.map(|raw| parse_enum(&raw, field)).transpose()
}

/// Deserialize helper distinguishing an absent field from an explicit
/// `null`: absent stays `None`, `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
