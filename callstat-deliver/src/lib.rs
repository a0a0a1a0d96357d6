//! Delivery of generated reports to a chat-like transport.
//!
//! The core produces chunks; this crate owns the ordering rules around them
//! (large-report notice, failure message) and the [`ReportSink`] seam a real
//! transport implements.

use async_trait::async_trait;
use callstat_core::{ReportConfig, ReportError};
use callstat_types::ReportRequest;
use thiserror::Error;
use tracing::{info, warn};

pub mod memory;
pub use memory::MemorySink;

/// Sent before the chunks of a report that did not fit in one message.
pub const LARGE_REPORT_NOTICE: &str = "Report is large. Sending in parts...";

const FAILURE_PREFIX: &str = "Analysis failed:\n";
const ELLIPSIS: &str = "...";

#[derive(Debug, Error)]
#[error("delivery failed: {message}")]
pub struct DeliveryError {
    pub message: String,
}

/// Outbound side of the transport: one call per message.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeliveryLimits {
    /// Hard per-message limit of the transport, in characters.
    pub max_message_len: usize,
}

impl Default for DeliveryLimits {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for DeliveryLimits {
    fn from(config: &ReportConfig) -> Self {
        Self {
            max_message_len: config.max_message_len,
        }
    }
}

/// Failure text for the requester, cut to `max_len` characters with a
/// trailing `...` when longer. The suffix itself shrinks for limits below 3.
pub fn failure_message(err: &dyn std::fmt::Display, max_len: usize) -> String {
    let text = format!("{FAILURE_PREFIX}{err}");
    if text.chars().count() <= max_len {
        return text;
    }
    let suffix = &ELLIPSIS[..ELLIPSIS.len().min(max_len)];
    let mut cut: String = text.chars().take(max_len - suffix.len()).collect();
    cut.push_str(suffix);
    cut
}

/// Send a report outcome through `sink`. Returns the number of messages sent.
///
/// Stops at the first failed send; the remaining chunks are not attempted.
pub async fn deliver_report(
    sink: &dyn ReportSink,
    request: &ReportRequest,
    result: Result<Vec<String>, ReportError>,
    limits: DeliveryLimits,
) -> Result<usize, DeliveryError> {
    let messages: Vec<String> = match result {
        Ok(chunks) if chunks.len() > 1 => std::iter::once(LARGE_REPORT_NOTICE.to_string())
            .chain(chunks)
            .collect(),
        Ok(chunks) => chunks,
        Err(err) => {
            warn!(
                request_id = %request.id,
                requester = %request.requester,
                error = %err,
                "report failed"
            );
            vec![failure_message(&err, limits.max_message_len)]
        }
    };

    for (sent, message) in messages.iter().enumerate() {
        if let Err(err) = sink.send(message).await {
            warn!(
                request_id = %request.id,
                sent,
                total = messages.len(),
                error = %err,
                "send failed"
            );
            return Err(err);
        }
    }

    info!(
        request_id = %request.id,
        report_type = %request.report_type,
        messages = messages.len(),
        "report delivered"
    );
    Ok(messages.len())
}
