//! Field coercion, canonical formatting, id composition and dedupe.
//!
//! Raw records are permissive: any field may be absent or arrive with a
//! drifting representation. Everything that ends up in an id or a
//! timestamp column goes through one canonical textual form so that
//! repeated fetches of the same logical record always produce the same
//! row.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde_json::Value;
use thiserror::Error;

use crate::models::RawRecord;

/// Canonical storage format for timestamps.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("missing key field `{0}`")]
    MissingKeyField(&'static str),
}

/// Parse a timestamp as the remote endpoint emits it (ISO 8601, with or
/// without a `Z` suffix) or as we store it.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }
    let trimmed = trimmed.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT))
        .ok()
}

/// Parse a timestamp previously stored in canonical form.
pub fn parse_stored_datetime(value: &str) -> Option<NaiveDateTime> {
    parse_datetime(value)
}

/// Coerce a scalar JSON value to its canonical string form. Dates are
/// normalized to [`DATETIME_FORMAT`], integral numbers lose any float
/// representation drift. Returns `None` for null and non-scalar values.
pub fn canonical_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                Some(n.to_string())
            }
        }
        Value::String(s) => {
            if let Some(dt) = parse_datetime(s) {
                Some(dt.format(DATETIME_FORMAT).to_string())
            } else {
                Some(s.clone())
            }
        }
        _ => None,
    }
}

/// Canonical string value of a field, if present.
pub fn get_str(raw: &RawRecord, field: &str) -> Option<String> {
    raw.get(field).and_then(canonical_scalar)
}

/// Integer value of a field; numeric strings are accepted.
pub fn get_i64(raw: &RawRecord, field: &str) -> Option<i64> {
    match raw.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float value of a field; numeric strings are accepted.
pub fn get_f64(raw: &RawRecord, field: &str) -> Option<f64> {
    match raw.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Canonical timestamp text of a field, if present and parseable.
pub fn get_datetime(raw: &RawRecord, field: &str) -> Option<String> {
    let value = raw.get(field)?;
    let text = match value {
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    parse_datetime(text).map(|dt| dt.format(DATETIME_FORMAT).to_string())
}

/// Canonical value of a key field. Absence fails the record, not the
/// batch: the caller counts it as skipped.
pub fn key_part(raw: &RawRecord, field: &'static str) -> Result<String, TransformError> {
    raw.get(field)
        .and_then(canonical_scalar)
        .ok_or(TransformError::MissingKeyField(field))
}

/// Join ordered key parts into a stable, human-auditable id.
pub fn compose_id(parts: &[String]) -> String {
    parts.join("_")
}

/// Drop records sharing an id, keeping the last-seen one while
/// preserving first-seen order. True duplicates returned by the source
/// would otherwise cost redundant upsert calls.
pub fn dedupe_by_id<T>(rows: Vec<T>, id_of: impl Fn(&T) -> &str) -> Vec<T> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    let mut slots: Vec<Option<T>> = Vec::with_capacity(rows.len());

    for row in rows {
        let id = id_of(&row).to_string();
        match index.get(&id) {
            Some(&slot) => slots[slot] = Some(row),
            None => {
                index.insert(id, slots.len());
                slots.push(Some(row));
            }
        }
    }

    slots.into_iter().flatten().collect()
}
