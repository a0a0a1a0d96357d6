use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use callstat_classifier::OutcomeClassifier;
use callstat_schema::{CallRecords, HeaderNormalizer};
use callstat_types::{BucketMetrics, ReportType};
use tracing::{debug, info, warn};

use crate::bucket::bucket_by_minute;
use crate::chunk::split_chunks;
use crate::config::ReportConfig;
use crate::filter::RowFilter;
use crate::metrics::compute_metrics;
use crate::render::{render_report, NO_DATA_AFTER_FILTERING};
use crate::rows::call_records;
use crate::ReportError;

/// Result of the aggregation stages.
#[derive(Clone, Debug, PartialEq)]
pub enum Aggregation {
    /// No row survived filtering; later stages did not run.
    Empty,
    /// Metrics for the retained minutes, ascending by minute.
    Buckets(Vec<BucketMetrics>),
}

/// Entry point of the report transform. Holds only compiled configuration;
/// every call is independent of the previous ones.
#[derive(Clone, Debug)]
pub struct ReportEngine {
    config: ReportConfig,
    classifier: OutcomeClassifier,
    filter: RowFilter,
    headers: HeaderNormalizer,
}

impl Default for ReportEngine {
    fn default() -> Self {
        Self {
            config: ReportConfig::default(),
            classifier: OutcomeClassifier::default(),
            filter: RowFilter::new(ReportConfig::default().excluded_actors),
            headers: HeaderNormalizer::default(),
        }
    }
}

impl ReportEngine {
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        config.validate()?;
        let classifier = OutcomeClassifier::new(&config.answering_machine, &config.silence)?;
        let filter = RowFilter::new(&config.excluded_actors);
        let headers = HeaderNormalizer::new(config.column_aliases.clone());
        Ok(Self {
            config,
            classifier,
            filter,
            headers,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Normalize headers, check columns, filter, bucket and compute metrics.
    pub fn aggregate(&self, batch: &RecordBatch) -> Result<Aggregation, ReportError> {
        let normalized = self.headers.normalize(batch)?;
        let table = CallRecords::new(Arc::new(normalized))?;
        let records = call_records(&table)?;

        let timed = self.filter.apply(records);
        if timed.is_empty() {
            debug!(rows = batch.num_rows(), "no rows left after filtering");
            return Ok(Aggregation::Empty);
        }

        let buckets = bucket_by_minute(timed, self.config.window_count);
        let metrics = buckets
            .iter()
            .filter_map(|b| compute_metrics(b, &self.classifier))
            .collect();
        Ok(Aggregation::Buckets(metrics))
    }

    pub fn render(
        &self,
        batch: &RecordBatch,
        report_type: ReportType,
    ) -> Result<String, ReportError> {
        self.render_with(batch, Some(report_type))
    }

    /// Render for a raw tag as received from a caller. An unknown tag renders
    /// no blocks instead of failing.
    pub fn render_tagged(&self, batch: &RecordBatch, tag: &str) -> Result<String, ReportError> {
        let report_type = ReportType::from_tag(tag);
        if report_type.is_none() {
            warn!(tag, "unknown report type");
        }
        self.render_with(batch, report_type)
    }

    fn render_with(
        &self,
        batch: &RecordBatch,
        report_type: Option<ReportType>,
    ) -> Result<String, ReportError> {
        Ok(match self.aggregate(batch)? {
            Aggregation::Empty => NO_DATA_AFTER_FILTERING.to_string(),
            Aggregation::Buckets(metrics) => {
                render_report(&metrics, report_type, self.config.window_count)
            }
        })
    }

    /// Full transform: rendered report split into transport-sized chunks.
    pub fn run(
        &self,
        batch: &RecordBatch,
        report_type: ReportType,
    ) -> Result<Vec<String>, ReportError> {
        let report = self.render(batch, report_type)?;
        let chunks = split_chunks(&report, self.config.max_chunk_len);
        info!(
            report_type = %report_type,
            rows = batch.num_rows(),
            chars = report.chars().count(),
            chunks = chunks.len(),
            "report generated"
        );
        Ok(chunks)
    }
}
