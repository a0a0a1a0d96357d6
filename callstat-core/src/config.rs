use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use callstat_classifier::{default_answering_machine, default_silence, MatcherSpec};
use callstat_schema::default_aliases;
use serde::{Deserialize, Serialize};

use crate::ReportError;

pub const DEFAULT_WINDOW_COUNT: usize = 10;
/// Payload limit per chat message chunk.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 4000;
/// Hard ceiling the chat transport enforces on a single message.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 4096;

/// Tunables for one engine. Every field is optional in the YAML file.
///
/// ```yaml
/// excluded_actors: ["(без ответственного)", "IT Отдел"]
/// answering_machine:
///   - contains: Автоответчик
/// silence:
///   - equals: Тишина
/// window_count: 10
/// max_chunk_len: 4000
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Employee values that are not agents (unassigned calls, department rows).
    pub excluded_actors: Vec<String>,
    pub answering_machine: Vec<MatcherSpec>,
    pub silence: Vec<MatcherSpec>,
    /// Source header -> canonical column name.
    pub column_aliases: BTreeMap<String, String>,
    /// How many of the most recent minute buckets are reported.
    pub window_count: usize,
    pub max_chunk_len: usize,
    pub max_message_len: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            excluded_actors: vec!["(без ответственного)".into(), "IT Отдел".into()],
            answering_machine: default_answering_machine(),
            silence: default_silence(),
            column_aliases: default_aliases(),
            window_count: DEFAULT_WINDOW_COUNT,
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

impl ReportConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ReportError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: ReportConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ReportError> {
        if self.window_count == 0 {
            return Err(ReportError::Config("window_count must be at least 1".into()));
        }
        if self.max_chunk_len == 0 {
            return Err(ReportError::Config("max_chunk_len must be at least 1".into()));
        }
        // Room for the "..." truncation suffix.
        if self.max_message_len < 4 {
            return Err(ReportError::Config("max_message_len must be at least 4".into()));
        }
        Ok(())
    }
}
