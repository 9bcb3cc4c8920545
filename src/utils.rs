use axum::http::StatusCode;
use libsql::Value;
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};
use uuid::Uuid;

use crate::constants::*;

const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn db_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

/// Storage failures are logged with their context and surfaced as a
/// generic server error.
pub fn db_error_with_context(context: &str) -> (StatusCode, String) {
    tracing::error!("database error: {context}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

pub fn is_valid_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

pub fn validate_user_id(user_id: &str) -> Result<(), (StatusCode, String)> {
    if is_valid_id(user_id) {
        Ok(())
    } else {
        Err((StatusCode::BAD_REQUEST, ERR_INVALID_USER_ID.to_string()))
    }
}

pub fn validate_record_id(id: &str, label: &str) -> Result<(), (StatusCode, String)> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err((StatusCode::BAD_REQUEST, format!("Invalid {} ID", label)))
    }
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be empty", field_name),
        ));
    }
    if value.len() > max_length {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be less than {} characters", field_name, max_length),
        ));
    }
    Ok(())
}

/// Parse an RFC 3339 date-time or a plain `YYYY-MM-DD` date (midnight UTC)
/// into unix seconds.
pub fn parse_date(value: &str) -> Result<i64, (StatusCode, String)> {
    if let Ok(datetime) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(datetime.unix_timestamp());
    }
    Date::parse(value, DATE_ONLY)
        .map(|date| date.midnight().assume_utc().unix_timestamp())
        .map_err(|_| (StatusCode::BAD_REQUEST, ERR_INVALID_DATE.to_string()))
}

/// Parse an optional date string; `None` stays `None` without error.
pub fn parse_date_opt(value: Option<&str>) -> Result<Option<i64>, (StatusCode, String)> {
    value.map(parse_date).transpose()
}

pub fn now_timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// `YYYY-MM-DD` rendering of a stored unix-seconds date, for report rows.
pub fn format_date(timestamp: i64) -> String {
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|datetime| datetime.date().format(DATE_ONLY).ok())
        .unwrap_or_else(|| "-".to_string())
}

// NULL-safe bindings for optional columns.

pub fn opt_text(value: Option<&str>) -> Value {
    match value {
        Some(text) => Value::Text(text.to_string()),
        None => Value::Null,
    }
}

pub fn opt_real(value: Option<f64>) -> Value {
    match value {
        Some(real) => Value::Real(real),
        None => Value::Null,
    }
}

pub fn opt_integer(value: Option<i64>) -> Value {
    match value {
        Some(integer) => Value::Integer(integer),
        None => Value::Null,
    }
}

// NULL-safe reads for optional columns.

pub fn column_opt_text(row: &libsql::Row, idx: i32) -> libsql::Result<Option<String>> {
    Ok(match row.get_value(idx)? {
        Value::Text(text) => Some(text),
        _ => None,
    })
}

pub fn column_opt_real(row: &libsql::Row, idx: i32) -> libsql::Result<Option<f64>> {
    Ok(match row.get_value(idx)? {
        Value::Real(real) => Some(real),
        Value::Integer(integer) => Some(integer as f64),
        _ => None,
    })
}

pub fn column_opt_integer(row: &libsql::Row, idx: i32) -> libsql::Result<Option<i64>> {
    Ok(match row.get_value(idx)? {
        Value::Integer(integer) => Some(integer),
        _ => None,
    })
}
