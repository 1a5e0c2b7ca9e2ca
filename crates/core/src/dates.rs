//! Date field normalization
//!
//! The API reports dates as epoch seconds. Every field whose name ends with
//! [`DATE_FIELD_SUFFIX`] is rewritten to a `dd-mm-yyyy` calendar string in UTC.
//! Conversion happens once per record; feeding an already converted record
//! back in reports every date field as malformed and leaves it untouched.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::TransformError;
use crate::record::{Record, Value};

pub const DATE_FIELD_SUFFIX: &str = "_date";

pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Whether a field name follows the date field convention
pub fn is_date_field(name: &str) -> bool {
    name.ends_with(DATE_FIELD_SUFFIX)
}

/// Convert epoch seconds to `dd-mm-yyyy` (UTC)
///
/// Returns `None` when the year falls outside 1..=9999, where the format
/// stops being exactly four digits.
pub fn format_epoch_date(seconds: i64) -> Option<String> {
    let dt = DateTime::<Utc>::from_timestamp(seconds, 0)?;
    if !(1..=9999).contains(&dt.year()) {
        return None;
    }
    Some(dt.format(DATE_FORMAT).to_string())
}

/// Parse a `dd-mm-yyyy` string back into a calendar day
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Convert a single date value
pub fn convert_date_value(field: &str, value: &Value) -> Result<Value, TransformError> {
    let malformed = |reason: String| TransformError {
        field: field.to_string(),
        reason,
    };

    match value {
        Value::Integer(seconds) => format_epoch_date(*seconds)
            .map(Value::Text)
            .ok_or_else(|| malformed(format!("{seconds} is out of range for a date"))),
        Value::Null => Err(malformed("value is missing".to_string())),
        other => Err(malformed(format!(
            "expected epoch seconds, got {} '{}'",
            other.kind(),
            other
        ))),
    }
}

/// Rewrite every date field of a record
///
/// Non-date fields pass through unchanged. A date field that cannot be
/// converted keeps its original value and contributes one `TransformError`
/// to the returned list.
pub fn transform_record(record: Record) -> (Record, Vec<TransformError>) {
    let mut errors = Vec::new();

    let transformed = record
        .into_iter()
        .map(|(name, value)| {
            if !is_date_field(&name) {
                return (name, value);
            }
            match convert_date_value(&name, &value) {
                Ok(converted) => (name, converted),
                Err(err) => {
                    errors.push(err);
                    (name, value)
                }
            }
        })
        .collect();

    (transformed, errors)
}

/// Transform a batch of records, keeping their order
pub fn transform_records(records: Vec<Record>) -> (Vec<Record>, Vec<TransformError>) {
    let mut errors = Vec::new();
    let transformed = records
        .into_iter()
        .map(|record| {
            let (record, mut record_errors) = transform_record(record);
            errors.append(&mut record_errors);
            record
        })
        .collect();
    (transformed, errors)
}
