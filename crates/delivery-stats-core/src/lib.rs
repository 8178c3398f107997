pub mod error;
pub mod filters;
mod frames;
pub mod ingestion;
pub mod moving_average;
pub mod outputs;
pub mod pipeline;
pub mod resample;
pub mod types;

pub use error::{PipelineError, Result, SchemaError};
pub use filters::{RecordFilters, MATCH_ALL};
pub use pipeline::{run, run_file, PipelineOptions, PipelineOutput, RunSummary};
pub use types::{EventRecord, Minute, Sample};
