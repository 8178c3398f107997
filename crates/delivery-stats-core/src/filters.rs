use chrono::TimeDelta;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::types::EventRecord;

/// Pattern used when a filter is left unset.
pub const MATCH_ALL: &str = ".*";

static MATCH_ALL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(MATCH_ALL).expect("match-all pattern compiles"));

/// Client and language filters. Patterns are unanchored, so `en` also matches `en-us`.
#[derive(Debug, Clone)]
pub struct RecordFilters {
    pub client: Regex,
    pub source: Regex,
    pub target: Regex,
}

impl Default for RecordFilters {
    fn default() -> Self {
        Self {
            client: MATCH_ALL_REGEX.clone(),
            source: MATCH_ALL_REGEX.clone(),
            target: MATCH_ALL_REGEX.clone(),
        }
    }
}

impl RecordFilters {
    pub fn new(client: &str, source: &str, target: &str) -> Result<Self> {
        Ok(Self {
            client: compile("client", client)?,
            source: compile("source", source)?,
            target: compile("target", target)?,
        })
    }

    /// All three patterns must match. A record without the field never matches.
    pub fn matches(&self, record: &EventRecord) -> bool {
        field_matches(&self.source, record.source_language.as_deref())
            && field_matches(&self.target, record.target_language.as_deref())
            && field_matches(&self.client, record.client_name.as_deref())
    }
}

fn compile(filter: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| PipelineError::InvalidPattern { filter, source })
}

fn field_matches(pattern: &Regex, value: Option<&str>) -> bool {
    value.is_some_and(|text| pattern.is_match(text))
}

pub fn apply_pattern_filters(records: &[EventRecord], filters: &RecordFilters) -> Vec<EventRecord> {
    let kept: Vec<EventRecord> = records
        .iter()
        .filter(|record| filters.matches(record))
        .cloned()
        .collect();

    debug!(before = records.len(), after = kept.len(), "applied pattern filters");
    kept
}

/// Drops records that fall before the trailing window, keeping one carry-in record.
///
/// `records` must be sorted by timestamp. With `last` the final timestamp and
/// `cutoff = last - window_minutes`, a record survives iff the timestamp of the record after it
/// is strictly later than `cutoff`. The final record compares against its own timestamp. The
/// result is that the last record before the cutoff stays, giving the first in-window minute a
/// real predecessor for the moving average.
pub fn apply_window_cutoff(records: &[EventRecord], window_minutes: u32) -> Vec<EventRecord> {
    let Some(last) = records.last() else {
        return Vec::new();
    };

    let Some(cutoff) = last
        .timestamp
        .checked_sub_signed(TimeDelta::minutes(i64::from(window_minutes)))
    else {
        return records.to_vec();
    };

    let next_timestamps = records
        .iter()
        .skip(1)
        .chain(std::iter::once(last))
        .map(|record| record.timestamp);

    let kept: Vec<EventRecord> = records
        .iter()
        .zip(next_timestamps)
        .filter(|(_, next)| *next > cutoff)
        .map(|(record, _)| record.clone())
        .collect();

    debug!(
        before = records.len(),
        after = kept.len(),
        %cutoff,
        "applied window cutoff"
    );
    kept
}
