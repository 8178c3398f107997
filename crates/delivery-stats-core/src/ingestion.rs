use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{PipelineError, Result, SchemaError};
use crate::types::{
    EventRecord, CLIENT_FIELD, DURATION_FIELD, REQUIRED_FIELDS, SOURCE_LANGUAGE_FIELD,
    TARGET_LANGUAGE_FIELD, TIMESTAMP_FIELD,
};

/// A parsed input line: field name to raw JSON value.
pub type RawRecord = Map<String, Value>;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Reads, parses and validates the input file, returning records sorted by timestamp.
pub fn load_records(path: &Path) -> Result<Vec<EventRecord>> {
    let contents = read_input(path)?;
    let rows = parse_lines(&contents)?;
    build_records(&rows)
}

pub fn read_input(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(PipelineError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|err| {
        let valid = &err.as_bytes()[..err.utf8_error().valid_up_to()];
        let line = valid.iter().filter(|b| **b == b'\n').count() + 1;
        PipelineError::MalformedInput {
            line,
            reason: "file contents were not valid UTF-8".to_string(),
        }
    })
}

/// Parses one JSON object per line. Any other line shape, blank lines included, rejects the
/// whole input.
pub fn parse_lines(contents: &str) -> Result<Vec<RawRecord>> {
    let mut rows = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            return Err(PipelineError::MalformedInput {
                line: idx + 1,
                reason: "blank line".to_string(),
            });
        }

        let value: Value =
            serde_json::from_str(line).map_err(|err| PipelineError::MalformedInput {
                line: idx + 1,
                reason: err.to_string(),
            })?;

        match value {
            Value::Object(map) => rows.push(map),
            other => {
                return Err(PipelineError::MalformedInput {
                    line: idx + 1,
                    reason: format!("expected a JSON object, found {}", json_kind(&other)),
                })
            }
        }
    }

    debug!(rows = rows.len(), "parsed input lines");
    Ok(rows)
}

/// Checks the field union, types each row and sorts by timestamp (stable, so ties keep input order).
pub fn build_records(rows: &[RawRecord]) -> Result<Vec<EventRecord>> {
    check_required_fields(rows)?;

    let mut records = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| to_event_record(idx + 1, row))
        .collect::<std::result::Result<Vec<_>, SchemaError>>()?;

    records.sort_by_key(|record| record.timestamp);
    Ok(records)
}

pub fn check_required_fields(rows: &[RawRecord]) -> std::result::Result<(), SchemaError> {
    let observed: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !observed.contains(field))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::MissingFields { missing })
    }
}

fn to_event_record(record: usize, row: &RawRecord) -> std::result::Result<EventRecord, SchemaError> {
    let timestamp = match row.get(TIMESTAMP_FIELD) {
        Some(Value::String(text)) => {
            parse_timestamp(text).ok_or_else(|| SchemaError::InvalidTimestamp {
                record,
                value: text.clone(),
            })?
        }
        other => {
            return Err(SchemaError::InvalidTimestamp {
                record,
                value: other.map_or_else(|| "<missing>".to_string(), Value::to_string),
            })
        }
    };

    let duration = match row.get(DURATION_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::Number(number)) => number.as_f64(),
        Some(other) => {
            return Err(SchemaError::InvalidDuration {
                record,
                value: other.to_string(),
            })
        }
    };

    Ok(EventRecord {
        timestamp,
        duration,
        client_name: text_field(row, CLIENT_FIELD),
        source_language: text_field(row, SOURCE_LANGUAGE_FIELD),
        target_language: text_field(row, TARGET_LANGUAGE_FIELD),
    })
}

fn text_field(row: &RawRecord, field: &str) -> Option<String> {
    row.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Parses the timestamp shapes seen in delivery logs. Offsets are normalized to UTC.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
