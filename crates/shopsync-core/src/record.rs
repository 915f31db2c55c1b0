//! Flat key/value records built from nested API payloads.
//!
//! Nested objects are flattened by joining their key path with `.`, so a
//! customer's `{"default_address": {"city": "Milwaukee"}}` becomes the single
//! column `default_address.city`. Arrays are left intact and rendered as JSON
//! text when written out.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Separator used to join nested key paths.
pub const PATH_SEPARATOR: char = '.';

/// One flattened business entity. Key order follows the source payload.
pub type Record = Map<String, Value>;

/// Flattens a JSON value into a [`Record`].
///
/// Non-object inputs are stored under a single `value` key.
#[must_use]
pub fn flatten(value: &Value) -> Record {
    let mut out = Record::new();
    match value {
        Value::Object(map) => flatten_into(&mut out, None, map),
        other => {
            out.insert("value".to_owned(), other.clone());
        }
    }
    out
}

fn flatten_into(out: &mut Record, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let path = match prefix {
            Some(p) => format!("{p}{PATH_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, Some(&path), nested),
            other => {
                out.insert(path, other.clone());
            }
        }
    }
}

/// Returns the latest timestamp stored under `field` across `records`.
///
/// Values that are missing or not RFC 3339 strings are ignored.
#[must_use]
pub fn max_timestamp(records: &[Record], field: &str) -> Option<DateTime<Utc>> {
    records
        .iter()
        .filter_map(|r| r.get(field).and_then(Value::as_str))
        .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .max()
}
