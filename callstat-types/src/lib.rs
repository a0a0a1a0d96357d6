use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A time-like cell as it arrives from the source table.
///
/// Text cells still need parsing; native Arrow time columns are already
/// structured and only need a reference date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeValue<'a> {
    Missing,
    Text(&'a str),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Any cell type with no time-of-day semantics (numbers, booleans, ...).
    Unsupported,
}

/// One call row, borrowed from the Arrow batch it was read from.
#[derive(Clone, Copy, Debug)]
pub struct CallRecord<'a> {
    pub actor: Option<&'a str>,
    pub time: TimeValue<'a>,
    pub outcome: Option<&'a str>,
}

/// Rendering mode: which metrics show up in each bucket block.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ReportType {
    Full,
    AoOnly,
    SilenceOnly,
    AoSilence,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Full,
        ReportType::AoOnly,
        ReportType::SilenceOnly,
        ReportType::AoSilence,
    ];

    /// Wire tag used by callers (chat buttons, CLI flags).
    pub const fn tag(self) -> &'static str {
        match self {
            ReportType::Full => "full",
            ReportType::AoOnly => "ao_only",
            ReportType::SilenceOnly => "silence_only",
            ReportType::AoSilence => "ao_silence",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    pub const fn shows_counts(self) -> bool {
        matches!(self, ReportType::Full)
    }

    pub const fn shows_answering_machine(self) -> bool {
        !matches!(self, ReportType::SilenceOnly)
    }

    pub const fn shows_silence(self) -> bool {
        !matches!(self, ReportType::AoOnly)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown report type '{0}'")]
pub struct UnknownReportType(pub String);

impl FromStr for ReportType {
    type Err = UnknownReportType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| UnknownReportType(s.to_string()))
    }
}

/// Aggregates for one `HH:MM` bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BucketMetrics {
    pub minute: String,
    pub total: usize,
    pub answering_machine_count: usize,
    pub silence_count: usize,
    pub distinct_actors: usize,
    pub avg_calls_per_actor: f64,
    pub pct_answering_machine: f64,
    pub pct_silence: f64,
}

/// Request-scoped context handed in by the transport.
#[derive(Clone, Debug)]
pub struct ReportRequest {
    pub id: Uuid,
    /// Opaque requester identity (chat id, user name, ...).
    pub requester: String,
    pub report_type: ReportType,
}

impl ReportRequest {
    pub fn new(requester: impl Into<String>, report_type: ReportType) -> Self {
        Self {
            id: Uuid::new_v4(),
            requester: requester.into(),
            report_type,
        }
    }
}
