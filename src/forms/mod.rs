//! Request payloads validated with `validator` and sanitized into domain values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod customers;
pub mod holidays;
pub mod invoices;
pub mod locations;
pub mod loyalty;
pub mod merchants;
pub mod staff;
pub mod staff_blocks;

/// Collapse runs of whitespace and drop control characters.
pub fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitize every line and squeeze consecutive blank lines.
pub fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        let is_empty = line.is_empty();
        if is_empty {
            if previous_empty {
                continue;
            }
            previous_empty = true;
            result.push(String::new());
        } else {
            previous_empty = false;
            result.push(line);
        }
    }

    result.join("\n")
}

/// Sanitized inline text, `None` when nothing is left.
pub fn optional_inline(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_inline_text)
        .filter(|value| !value.is_empty())
}

/// Sanitized multi-line text, `None` when nothing is left.
pub fn optional_multiline(input: Option<&str>) -> Option<String> {
    input
        .map(sanitize_multiline_text)
        .filter(|value| !value.is_empty())
}

/// Timestamp accepted either as RFC 3339 or as a naive `YYYY-MM-DDTHH:MM[:SS]` UTC value.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Deserialize an instant string through [`parse_instant`].
pub fn deserialize_instant<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_instant(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

/// Optional variant of [`deserialize_instant`]; empty strings read as `None`.
pub fn deserialize_optional_instant<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_instant(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{value}`"))),
    }
}
