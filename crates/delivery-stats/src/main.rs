use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use delivery_stats_core::{outputs, run_file, PipelineOptions, RecordFilters, MATCH_ALL};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Minute-by-minute moving average of translation delivery times",
    long_about = None
)]
struct Cli {
    /// Text file with one JSON event per line
    #[arg(
        short = 'i',
        long = "input_file",
        value_name = "FILENAME",
        env = "DELIVERY_STATS_INPUT_FILE"
    )]
    input_file: PathBuf,

    /// Report only the last <MINUTES> minutes. If the most recent event is from 17:11 and the
    /// window is 10, averages are reported for every minute between 17:02 and 17:11. Without
    /// it the whole range between the first and last event is reported.
    #[arg(
        short = 'w',
        long = "window",
        visible_alias = "window_size",
        value_name = "MINUTES",
        env = "DELIVERY_STATS_WINDOW"
    )]
    window: Option<u32>,

    /// Only count translations for clients matching this pattern
    #[arg(
        short = 'c',
        long,
        value_name = "NAME",
        default_value = MATCH_ALL,
        env = "DELIVERY_STATS_CLIENT"
    )]
    client: String,

    /// Only count translations whose source language matches this pattern (en, fr, de, ...)
    #[arg(
        short = 's',
        long,
        value_name = "LANGUAGE",
        default_value = MATCH_ALL,
        env = "DELIVERY_STATS_SOURCE"
    )]
    source: String,

    /// Only count translations whose target language matches this pattern
    #[arg(
        short = 't',
        long,
        value_name = "LANGUAGE",
        default_value = MATCH_ALL,
        env = "DELIVERY_STATS_TARGET"
    )]
    target: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    debug!(?cli, "resolved command line");

    let filters = RecordFilters::new(&cli.client, &cli.source, &cli.target)?;
    let options = PipelineOptions::new(cli.window, filters);

    let output = run_file(&cli.input_file, &options)
        .with_context(|| format!("failed to process {}", cli.input_file.display()))?;

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    outputs::write_samples(&mut writer, &output.samples).context("failed to write samples")?;

    Ok(())
}
