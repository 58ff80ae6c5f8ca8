use crate::types::{PostFormat, RawItem, Record, ValidationError, MAX_TEXT_CHARS, URL_NOT_AVAILABLE};
use crate::utils::{json, text};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Timestamps carrying an explicit offset.
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Timestamps without an offset; these are read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Turns scraped items into [`Record`]s.
///
/// Field defaults:
/// - `time` (ISO-8601 string), else `timestamp` (epoch seconds): required
/// - `text`: empty string, then cut to [`MAX_TEXT_CHARS`] characters
/// - `likes`, `comments`, `shares`: 0 unless numeric
/// - `url`: [`URL_NOT_AVAILABLE`]
///
/// The returned record is still `PostFormat::Unset`.
pub struct RecordValidator;

impl RecordValidator {
    pub fn validate(item: &RawItem) -> Result<Record, ValidationError> {
        let date = Self::extract_date(item)?;

        let text = json::as_str(item.get("text"))
            .map(|t| text::truncate_chars(t, MAX_TEXT_CHARS))
            .unwrap_or_default();

        let url = json::as_str(item.get("url"))
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(URL_NOT_AVAILABLE)
            .to_string();

        Ok(Record {
            date,
            format: PostFormat::Unset,
            text,
            likes: json::coerce_count(item.get("likes")),
            comments: json::coerce_count(item.get("comments")),
            shares: json::coerce_count(item.get("shares")),
            url,
        })
    }

    fn extract_date(item: &RawItem) -> Result<NaiveDate, ValidationError> {
        match item.get("time") {
            Some(Value::String(s)) if !s.trim().is_empty() => return parse_post_date(s),
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => return Err(ValidationError::InvalidDate(other.to_string())),
        }

        match item.get("timestamp") {
            None | Some(Value::Null) => Err(ValidationError::MissingDate),
            Some(Value::String(s)) if s.trim().is_empty() => Err(ValidationError::MissingDate),
            Some(Value::String(s)) => parse_post_date(s),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
                .map(|dt| dt.date_naive())
                .ok_or_else(|| ValidationError::InvalidDate(n.to_string())),
            Some(other) => Err(ValidationError::InvalidDate(other.to_string())),
        }
    }
}

/// Calendar date of an ISO-8601 timestamp, taken in UTC.
pub fn parse_post_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc).date_naive());
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc().date_naive());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate(s.to_string()))
}
