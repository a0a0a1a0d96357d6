use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::bail;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use callstat_core::{Aggregation, ReportConfig, ReportEngine};
use callstat_deliver::{deliver_report, DeliveryError, DeliveryLimits, ReportSink};
use callstat_types::{ReportRequest, ReportType};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::info;

mod load;

const RULE: &str = "----------------------------------------";

#[derive(Parser)]
#[command(name = "callstat", about = "Minute-by-minute dialer statistics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the text report, split into message-sized chunks.
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long = "type", default_value = "full")]
        report_type: ReportType,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print per-minute metrics as JSON.
    Buckets {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Writes each message, with a rule line between consecutive messages.
struct ConsoleSink<W> {
    out: Mutex<W>,
    written: AtomicUsize,
}

impl<W: Write + Send> ConsoleSink<W> {
    fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            written: AtomicUsize::new(0),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

fn write_message(out: &mut impl Write, ruled: bool, text: &str) -> io::Result<()> {
    if ruled {
        writeln!(out, "{RULE}")?;
    }
    writeln!(out, "{text}")?;
    out.flush()
}

#[async_trait]
impl<W: Write + Send> ReportSink for ConsoleSink<W> {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let mut out = self.out.lock().await;
        let ruled = self.written.fetch_add(1, Ordering::SeqCst) > 0;
        write_message(&mut *out, ruled, text).map_err(|e| DeliveryError {
            message: e.to_string(),
        })
    }
}

/// Run the engine and deliver the outcome. A failed report is still
/// delivered as a failure message, then surfaces as an error.
async fn report(
    engine: &ReportEngine,
    batch: &RecordBatch,
    request: &ReportRequest,
    sink: &dyn ReportSink,
) -> anyhow::Result<usize> {
    let result = engine.run(batch, request.report_type);
    let failed = result.is_err();
    let limits = DeliveryLimits::from(engine.config());
    let sent = deliver_report(sink, request, result, limits).await?;
    if failed {
        bail!("report for {} failed", request.requester);
    }
    Ok(sent)
}

fn engine(config: Option<&Path>) -> anyhow::Result<ReportEngine> {
    let config = match config {
        Some(path) => ReportConfig::from_path(path)?,
        None => ReportConfig::default(),
    };
    Ok(ReportEngine::new(config)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report {
            input,
            report_type,
            config,
        } => {
            let engine = engine(config.as_deref())?;
            let batch = load::load_table(&input)?;
            let request = ReportRequest::new(input.display().to_string(), report_type);
            info!(request_id = %request.id, input = %input.display(), "generating report");

            let sink = ConsoleSink::new(io::stdout());
            report(&engine, &batch, &request, &sink).await?;
        }
        Command::Buckets { input, config } => {
            let engine = engine(config.as_deref())?;
            let batch = load::load_table(&input)?;
            let metrics = match engine.aggregate(&batch)? {
                Aggregation::Empty => Vec::new(),
                Aggregation::Buckets(metrics) => metrics,
            };
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use callstat_deliver::LARGE_REPORT_NOTICE;

    use super::*;

    fn batch(names: [&str; 3], rows: &[(String, &str, &str)]) -> RecordBatch {
        let schema = Schema::new(
            names
                .iter()
                .map(|n| Field::new(*n, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.0.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.1))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.2))),
        ];
        RecordBatch::try_new(Arc::new(schema), columns).unwrap()
    }

    fn ten_minutes() -> Vec<(String, &'static str, &'static str)> {
        (0..10)
            .map(|m| (format!("11:{m:02}:00"), "Автоответчик", "Anna"))
            .collect()
    }

    #[tokio::test]
    async fn large_report_is_ruled_between_messages() {
        let engine = ReportEngine::new(ReportConfig {
            max_chunk_len: 300,
            ..ReportConfig::default()
        })
        .unwrap();
        let table = batch(["Time", "Result", "Employee"], &ten_minutes());
        let request = ReportRequest::new("calls.csv", ReportType::Full);
        let sink = ConsoleSink::new(Vec::new());

        let sent = report(&engine, &table, &request, &sink).await.unwrap();
        assert!(sent > 2);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with(&format!("{LARGE_REPORT_NOTICE}\n{RULE}\nStatistics from")));
        assert_eq!(out.lines().filter(|l| *l == RULE).count(), sent - 1);
        assert_eq!(out.matches("Statistics from").count(), 10);
    }

    #[tokio::test]
    async fn single_chunk_has_no_rule() {
        let engine = ReportEngine::default();
        let table = batch(["Time", "Result", "Employee"], &ten_minutes()[..1]);
        let request = ReportRequest::new("calls.csv", ReportType::AoOnly);
        let sink = ConsoleSink::new(Vec::new());

        assert_eq!(report(&engine, &table, &request, &sink).await.unwrap(), 1);
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "Statistics from 11:00 to 11:00\n- Calls: 1\n- <b>AO rate: 100.0%</b>\n"
        );
    }

    #[tokio::test]
    async fn failed_report_is_delivered_then_errors() {
        let engine = ReportEngine::default();
        let table = batch(["Time", "Outcome", "Agent"], &ten_minutes());
        let request = ReportRequest::new("calls.csv", ReportType::Full);
        let sink = ConsoleSink::new(Vec::new());

        let err = report(&engine, &table, &request, &sink).await.unwrap_err();
        assert!(err.to_string().contains("calls.csv"));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "Analysis failed:\nmissing columns: Result, Employee\n");
    }
}
