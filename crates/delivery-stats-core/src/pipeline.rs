use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::filters::{apply_pattern_filters, apply_window_cutoff, RecordFilters};
use crate::ingestion::load_records;
use crate::moving_average::delivery_moving_average;
use crate::outputs::project_samples;
use crate::resample::{bucket_means, forward_fill, to_time_series};
use crate::types::{EventRecord, Sample};

/// Resolved options for one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Trailing window in minutes. `None` reports the whole series.
    pub window: Option<u32>,
    pub filters: RecordFilters,
}

impl PipelineOptions {
    /// A zero-minute window means the same as no window.
    pub fn new(window: Option<u32>, filters: RecordFilters) -> Self {
        Self {
            window: window.filter(|minutes| *minutes > 0),
            filters,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records_read: usize,
    pub records_after_cutoff: usize,
    pub records_after_filters: usize,
    pub populated_buckets: usize,
    pub filled_buckets: usize,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub samples: Vec<Sample>,
    pub summary: RunSummary,
}

/// Loads `path` and runs every stage over it.
pub fn run_file(path: &Path, options: &PipelineOptions) -> Result<PipelineOutput> {
    let records = load_records(path)?;
    run(&records, options)
}

/// Runs cutoff, filters, resampling, averaging and projection over records sorted by timestamp.
///
/// A zero-minute window is treated as no window, however the options were built.
pub fn run(records: &[EventRecord], options: &PipelineOptions) -> Result<PipelineOutput> {
    let window = options.window.filter(|minutes| *minutes > 0);
    let windowed = match window {
        Some(minutes) => apply_window_cutoff(records, minutes),
        None => records.to_vec(),
    };

    let filtered = apply_pattern_filters(&windowed, &options.filters);
    if filtered.is_empty() && !records.is_empty() {
        warn!("no records matched the requested filters");
    }

    let buckets = bucket_means(&to_time_series(&filtered))?;
    let filled = forward_fill(&buckets)?;
    let averaged = delivery_moving_average(&filled)?;
    let samples = project_samples(&averaged, window)?;

    let summary = RunSummary {
        records_read: records.len(),
        records_after_cutoff: windowed.len(),
        records_after_filters: filtered.len(),
        populated_buckets: buckets.len(),
        filled_buckets: filled.len(),
        samples: samples.len(),
    };
    info!(
        records_read = summary.records_read,
        records_after_cutoff = summary.records_after_cutoff,
        records_after_filters = summary.records_after_filters,
        populated_buckets = summary.populated_buckets,
        filled_buckets = summary.filled_buckets,
        samples = summary.samples,
        window = ?window,
        "moving average computed"
    );

    Ok(PipelineOutput { samples, summary })
}
