use std::io::{self, Write};

use crate::error::{PipelineError, Result};
use crate::types::{Minute, Sample};

/// Keeps the last `window` rows (all rows when `None`) and renders dates as text.
pub fn project_samples(
    averaged: &[(Minute, Option<f64>)],
    window: Option<u32>,
) -> Result<Vec<Sample>> {
    let start = match window {
        Some(window) => averaged.len().saturating_sub(window as usize),
        None => 0,
    };

    averaged[start..]
        .iter()
        .map(|(minute, average)| {
            let date = minute.label().ok_or_else(|| {
                PipelineError::Processing(format!(
                    "bucket label out of range: {} minutes since epoch",
                    minute.epoch_minutes()
                ))
            })?;
            Ok(Sample {
                date,
                average_delivery_time: *average,
            })
        })
        .collect()
}

/// Writes one JSON object per line, in the order given.
pub fn write_samples<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    for sample in samples {
        serde_json::to_writer(&mut *writer, sample)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
