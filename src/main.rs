mod engine;
mod fingerprint;
mod locks;
mod models;
mod normalizer;
mod storage;
mod summary;

use std::fs;
use std::io::{BufWriter, Write, stderr, stdout};
use std::path::Path;
use std::process::exit;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

use crate::engine::{IngestConfig, IngestEngine};
use crate::models::{IngestReport, Statistics};
use crate::storage::DatasetStore;
use crate::summary::SummaryAggregator;

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: If I was making a much more sophisticated CLI application, I would have used the clap crate
    //      to handle the CLI parsing and execution.
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    // A trailing argument naming a log level is peeled off before the command
    // itself is parsed, so both subcommands accept it.
    let log_level = match args.last().and_then(|arg| parse_log_level(arg)) {
        Some(level) => {
            args.pop();
            level
        }
        None => LevelFilter::ERROR
    };

    setup_logging(log_level);

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [data_dir, "ingest", input] => run_ingest(data_dir, input).await,
        [data_dir, "summary", user_id, rest @ ..] if rest.len() <= 2 => {
            let from = rest.first().map(|value| parse_date(value)).transpose()?;
            let to = rest.get(1).map(|value| parse_date(value)).transpose()?;
            run_summary(data_dir, user_id, from, to)
        }
        _ => {
            eprintln!("Usage: transaction-ingest [data_dir] ingest [input].csv [log_level:optional]");
            eprintln!("       transaction-ingest [data_dir] summary [user_id] [from:optional] [to:optional] [log_level:optional]");
            eprintln!("Dates use YYYY-MM-DD. Available log levels: error, warn, info, debug, trace (default: error)");
            exit(1);
        }
    }
}

async fn run_ingest(data_dir: &str, input: &str) -> Result<()> {
    let raw = fs::read(input)?;
    let engine = IngestEngine::new(IngestConfig::new(data_dir));

    let report = engine.ingest(&raw).await?;

    info!("Upload recorded at {}", engine.manifest().path().display());

    write_report_to_stdout(&report)
}

fn run_summary(data_dir: &str, user_id: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    let aggregator = SummaryAggregator::new(DatasetStore::new(Path::new(data_dir)));

    let statistics = aggregator.summarize(user_id, from, to)?;

    write_statistics_to_stdout(&statistics)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(value, "%Y-%m-%d")?)
}

fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        _ => None
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: Results go to stdout, so logging goes to stderr to keep the two streams separable
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_report_to_stdout(report: &IngestReport) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    writeln!(output, "outcome,fingerprint,accepted_rows,rejected_rows")?;
    writeln!(
        output,
        "{},{},{},{}",
        report.outcome.as_str(),
        report.fingerprint,
        report.accepted_rows,
        report.rejected_rows
    )?;

    output.flush()?;

    Ok(())
}

fn write_statistics_to_stdout(statistics: &Statistics) -> Result<()> {
    let mut output = BufWriter::new(stdout().lock());

    writeln!(output, "count,min,max,mean,total")?;
    writeln!(
        output,
        "{},{},{},{},{}",
        statistics.count,
        statistics.min,
        statistics.max,
        statistics.mean,
        statistics.total
    )?;

    output.flush()?;

    Ok(())
}
