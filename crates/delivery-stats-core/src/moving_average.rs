use polars::prelude::*;

use crate::error::Result;
use crate::frames::{minute_frame, read_minutes, read_values, AVERAGE_COLUMN, DURATION_COLUMN};
use crate::types::Minute;

/// Window used for the delivery-time average: the current minute and the one before it.
pub const DELIVERY_WINDOW: usize = 2;

/// Shortest window that still produces a value, so the first minute averages over itself.
pub const DELIVERY_MIN_PERIODS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingOptions {
    pub window: usize,
    pub min_periods: usize,
}

impl Default for RollingOptions {
    fn default() -> Self {
        Self {
            window: DELIVERY_WINDOW,
            min_periods: DELIVERY_MIN_PERIODS,
        }
    }
}

/// Trailing rolling mean over `options.window` rows ending at each row.
///
/// Rows whose window holds fewer than `options.min_periods` values yield `None`.
pub fn rolling_mean(
    series: &[(Minute, f64)],
    options: RollingOptions,
) -> Result<Vec<(Minute, Option<f64>)>> {
    if series.is_empty() {
        return Ok(Vec::new());
    }

    let averaged = minute_frame(series, DURATION_COLUMN)?
        .lazy()
        .with_column(
            col(DURATION_COLUMN)
                .rolling_mean(RollingOptionsFixedWindow {
                    window_size: options.window.max(1),
                    min_periods: options.min_periods,
                    ..Default::default()
                })
                .alias(AVERAGE_COLUMN),
        )
        .collect()?;

    let minutes = read_minutes(&averaged)?;
    let averages = read_values(&averaged, AVERAGE_COLUMN)?;
    Ok(minutes.into_iter().zip(averages).collect())
}

/// `mean(duration[i - 1], duration[i])`, degenerating to `duration[0]` on the first row.
pub fn delivery_moving_average(series: &[(Minute, f64)]) -> Result<Vec<(Minute, Option<f64>)>> {
    rolling_mean(series, RollingOptions::default())
}
