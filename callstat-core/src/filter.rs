use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::debug;

use callstat_types::CallRecord;

use crate::time::normalize_time;

/// A call that survived filtering, with its normalized instant.
#[derive(Clone, Copy, Debug)]
pub struct TimedRecord<'a> {
    pub record: CallRecord<'a>,
    pub instant: NaiveDateTime,
}

/// Drops non-agent rows and rows without a usable time.
#[derive(Clone, Debug, Default)]
pub struct RowFilter {
    excluded_actors: HashSet<String>,
}

impl RowFilter {
    pub fn new<I, S>(excluded_actors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_actors: excluded_actors.into_iter().map(Into::into).collect(),
        }
    }

    /// A row without an actor is kept; only listed actors are excluded.
    pub fn is_excluded(&self, actor: Option<&str>) -> bool {
        actor.is_some_and(|a| self.excluded_actors.contains(a))
    }

    pub fn apply<'a>(&self, records: Vec<CallRecord<'a>>) -> Vec<TimedRecord<'a>> {
        let input = records.len();
        let agents: Vec<CallRecord<'a>> = records
            .into_iter()
            .filter(|r| !self.is_excluded(r.actor))
            .collect();
        let excluded = input - agents.len();

        let kept: Vec<TimedRecord<'a>> = agents
            .into_iter()
            .filter_map(|record| {
                normalize_time(record.time).map(|instant| TimedRecord { record, instant })
            })
            .collect();
        let unparsed = input - excluded - kept.len();

        debug!(input, excluded, unparsed, kept = kept.len(), "filtered call rows");
        kept
    }
}
