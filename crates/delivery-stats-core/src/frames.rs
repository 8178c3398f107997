// crates/delivery-stats-core/src/frames.rs

use polars::prelude::*;

use crate::error::{PipelineError, Result};
use crate::types::Minute;

pub(crate) const DATE_COLUMN: &str = "date";
pub(crate) const DURATION_COLUMN: &str = "duration";
pub(crate) const AVERAGE_COLUMN: &str = "average_delivery_time";

/// Builds a `(date, value)` frame with a microsecond datetime index, sorted by date.
///
/// The sort keeps input order among equal dates.
pub(crate) fn timed_frame(
    micros: Vec<i64>,
    values: Vec<Option<f64>>,
    value_column: &str,
) -> Result<DataFrame> {
    let frame = df![
        DATE_COLUMN => micros,
        value_column => values,
    ]?
    .lazy()
    .with_column(col(DATE_COLUMN).cast(DataType::Datetime(TimeUnit::Microseconds, None)))
    .sort(
        [DATE_COLUMN],
        SortMultipleOptions::default().with_maintain_order(true),
    )
    .collect()?;

    Ok(frame)
}

pub(crate) fn minute_frame(series: &[(Minute, f64)], value_column: &str) -> Result<DataFrame> {
    let (micros, values): (Vec<i64>, Vec<Option<f64>>) = series
        .iter()
        .map(|(minute, value)| (minute.epoch_micros(), Some(*value)))
        .unzip();
    timed_frame(micros, values, value_column)
}

/// Reads the date index back as minute labels.
pub(crate) fn read_minutes(frame: &DataFrame) -> Result<Vec<Minute>> {
    let dates = frame.column(DATE_COLUMN)?.cast(&DataType::Int64)?;
    dates
        .i64()?
        .into_iter()
        .map(|micros| {
            micros
                .map(Minute::from_epoch_micros)
                .ok_or_else(|| PipelineError::Processing(format!("null {DATE_COLUMN} label")))
        })
        .collect()
}

pub(crate) fn read_values(frame: &DataFrame, value_column: &str) -> Result<Vec<Option<f64>>> {
    Ok(frame.column(value_column)?.f64()?.into_iter().collect())
}

/// Pairs the date index with a value column that must be fully populated.
pub(crate) fn read_minute_series(frame: &DataFrame, value_column: &str) -> Result<Vec<(Minute, f64)>> {
    let minutes = read_minutes(frame)?;
    let values = read_values(frame, value_column)?;

    minutes
        .into_iter()
        .zip(values)
        .map(|(minute, value)| {
            value.map(|value| (minute, value)).ok_or_else(|| {
                PipelineError::Processing(format!("missing {value_column} at {minute:?}"))
            })
        })
        .collect()
}
