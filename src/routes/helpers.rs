// routes/helpers.rs
// Shared payload parsing and response shaping for the API handlers.

use chrono::{NaiveDate, TimeZone, Utc};
use mongodb::bson::{DateTime, oid::ObjectId};
use serde_json::Value;

use crate::error::AppError;
use crate::models::User;
use crate::normalize::normalize_record;

pub fn parse_object_id(value: &str, what: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("invalid {what} id")))
}

/// Dates arrive either as RFC 3339 timestamps or as plain `YYYY-MM-DD` days,
/// which read as midnight UTC.
pub fn parse_date(value: &str, what: &str) -> Result<DateTime, AppError> {
    if let Ok(at) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(DateTime::from_chrono(at.with_timezone(&Utc)));
    }
    if let Some(at) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
    {
        return Ok(DateTime::from_chrono(Utc.from_utc_datetime(&at)));
    }
    Err(AppError::Validation(format!(
        "invalid {what}: expected an RFC 3339 timestamp or YYYY-MM-DD"
    )))
}

pub fn required_text(value: Option<String>, what: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{what} is required"))),
    }
}

/// Trims and drops empty strings, so `""` in a payload reads as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required_amount(value: Option<f64>, what: &str) -> Result<f64, AppError> {
    let amount = value.ok_or_else(|| AppError::Validation(format!("{what} is required")))?;
    nonnegative_amount(amount, what)
}

pub fn nonnegative_amount(value: f64, what: &str) -> Result<f64, AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::Validation(format!(
            "{what} must be a non-negative number"
        )));
    }
    Ok(value)
}

/// User payload for responses: normalized, with the password hash stripped.
pub fn user_json(user: &User) -> Value {
    let mut value = normalize_record(user);
    if let Some(fields) = value.as_object_mut() {
        fields.remove("passwordHash");
    }
    value
}

/// Attach a degradation notice to a record payload, if one was produced.
pub fn with_warning(mut value: Value, warning: Option<String>) -> Value {
    if let (Some(fields), Some(warning)) = (value.as_object_mut(), warning) {
        fields.insert("warning".to_string(), Value::String(warning));
    }
    value
}

pub fn join_warnings<const N: usize>(warnings: [Option<String>; N]) -> Option<String> {
    let parts: Vec<String> = warnings.into_iter().flatten().collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}
