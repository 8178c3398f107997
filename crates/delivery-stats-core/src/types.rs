// crates/delivery-stats-core/src/types.rs

use chrono::{DateTime, NaiveDateTime};
use serde::{Serialize, Serializer};

pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const DURATION_FIELD: &str = "duration";
pub const CLIENT_FIELD: &str = "client_name";
pub const SOURCE_LANGUAGE_FIELD: &str = "source_language";
pub const TARGET_LANGUAGE_FIELD: &str = "target_language";

/// Fields every input must expose (checked against the union of all records).
pub const REQUIRED_FIELDS: [&str; 5] = [
    TIMESTAMP_FIELD,
    DURATION_FIELD,
    CLIENT_FIELD,
    SOURCE_LANGUAGE_FIELD,
    TARGET_LANGUAGE_FIELD,
];

/// Rendering used for every instant written to the output stream.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Decimal places kept when averages are written out.
pub const OUTPUT_DECIMALS: i32 = 10;

const MICROS_PER_MINUTE: i64 = 60 * 1_000_000;

/// One translation delivery event. Fields other than the five named ones are dropped on ingest.
///
/// The schema gate only guarantees that each field shows up on *some* record, so individual
/// records may still lack a duration or one of the text fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub timestamp: NaiveDateTime,
    pub duration: Option<f64>,
    pub client_name: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

/// Irregular `(timestamp, duration)` pairs, ascending by timestamp.
pub type TimeSeries = Vec<(NaiveDateTime, Option<f64>)>;

/// Regular one-value-per-minute series keyed by bucket label.
pub type MinuteSeries = Vec<(Minute, f64)>;

/// A one-minute bucket label, stored as whole minutes since the Unix epoch (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Minute(i64);

impl Minute {
    pub fn from_epoch_minutes(minutes: i64) -> Self {
        Self(minutes)
    }

    pub fn epoch_minutes(self) -> i64 {
        self.0
    }

    /// Floors a microsecond timestamp to its minute.
    pub fn from_epoch_micros(micros: i64) -> Self {
        Self(micros.div_euclid(MICROS_PER_MINUTE))
    }

    pub fn epoch_micros(self) -> i64 {
        self.0.saturating_mul(MICROS_PER_MINUTE)
    }

    /// Label of the bucket holding `timestamp`: buckets cover `[m, m + 1min)` and carry the
    /// right edge as their label, so `17:03:45` and `17:03:00` both land in `17:04:00`.
    pub fn bucket_of(timestamp: NaiveDateTime) -> Self {
        let seconds = timestamp.and_utc().timestamp();
        Self(seconds.div_euclid(60) + 1)
    }

    pub fn to_datetime(self) -> Option<NaiveDateTime> {
        let seconds = self.0.checked_mul(60)?;
        DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
    }

    /// `DATE_FORMAT` text of the label, or `None` past the last representable instant.
    pub fn label(self) -> Option<String> {
        self.to_datetime().map(|dt| dt.format(DATE_FORMAT).to_string())
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub date: String,
    #[serde(serialize_with = "serialize_rounded")]
    pub average_delivery_time: Option<f64>,
}

/// Rounds to `decimals` places, leaving values that cannot be scaled untouched.
pub fn round_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

fn serialize_rounded<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => serializer.serialize_some(&round_decimals(*value, OUTPUT_DECIMALS)),
        None => serializer.serialize_none(),
    }
}
