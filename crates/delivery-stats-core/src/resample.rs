use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::frames::{minute_frame, read_minute_series, timed_frame, DATE_COLUMN, DURATION_COLUMN};
use crate::types::{EventRecord, Minute, MinuteSeries, TimeSeries};

const BUCKET_EVERY: &str = "1m";

/// Keeps only the `(timestamp, duration)` pairs needed downstream.
pub fn to_time_series(records: &[EventRecord]) -> TimeSeries {
    records
        .iter()
        .map(|record| (record.timestamp, record.duration))
        .collect()
}

/// Buckets the series into one-minute intervals and averages each bucket.
///
/// Buckets are closed on the left and labeled by their right edge. Missing durations are
/// skipped; buckets with no durations at all are left out and closed later by
/// [`forward_fill`].
pub fn bucket_means(series: &[(NaiveDateTime, Option<f64>)]) -> Result<MinuteSeries> {
    if series.is_empty() {
        return Ok(Vec::new());
    }

    let (micros, durations): (Vec<i64>, Vec<Option<f64>>) = series
        .iter()
        .map(|(timestamp, duration)| (timestamp.and_utc().timestamp_micros(), *duration))
        .unzip();

    let buckets = timed_frame(micros, durations, DURATION_COLUMN)?
        .lazy()
        .group_by_dynamic(
            col(DATE_COLUMN),
            Vec::<Expr>::new(),
            DynamicGroupOptions {
                every: Duration::parse(BUCKET_EVERY),
                period: Duration::parse(BUCKET_EVERY),
                offset: Duration::parse("0m"),
                label: Label::Right,
                closed_window: ClosedWindow::Left,
                start_by: StartBy::WindowBound,
                include_boundaries: false,
                ..Default::default()
            },
        )
        .agg([col(DURATION_COLUMN).mean()])
        .filter(col(DURATION_COLUMN).is_not_null())
        .collect()?;

    read_minute_series(&buckets, DURATION_COLUMN)
}

/// Expands a sorted bucket series into every minute from its first to its last label,
/// carrying the previous value into empty minutes.
///
/// The span starts at the first populated bucket, so there is never a leading gap without a
/// value to carry.
pub fn forward_fill(buckets: &[(Minute, f64)]) -> Result<MinuteSeries> {
    if buckets.is_empty() {
        return Ok(Vec::new());
    }

    let mut filled = minute_frame(buckets, DURATION_COLUMN)?.upsample(
        Vec::<PlSmallStr>::new(),
        DATE_COLUMN,
        Duration::parse(BUCKET_EVERY),
    )?;
    let carried = filled
        .column(DURATION_COLUMN)?
        .as_materialized_series()
        .fill_null(FillNullStrategy::Forward(None))?;
    filled.with_column(carried)?;

    let filled = read_minute_series(&filled, DURATION_COLUMN)?;
    debug!(
        populated = buckets.len(),
        filled = filled.len(),
        "forward-filled minute buckets"
    );
    Ok(filled)
}
