use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::filter::TimedRecord;

/// All calls that fall into one `HH:MM` minute.
#[derive(Clone, Debug)]
pub struct MinuteBucket<'a> {
    pub key: String,
    pub records: Vec<TimedRecord<'a>>,
}

/// Truncate to the minute and format as `HH:MM`.
pub fn minute_key(instant: &NaiveDateTime) -> String {
    instant.format("%H:%M").to_string()
}

/// Group by minute and keep the `window_count` latest keys, ascending.
///
/// Keys come from the data, so a quiet minute is skipped rather than reported
/// as empty and the window may span more than `window_count` clock minutes.
pub fn bucket_by_minute<'a>(
    records: Vec<TimedRecord<'a>>,
    window_count: usize,
) -> Vec<MinuteBucket<'a>> {
    let mut groups: BTreeMap<String, Vec<TimedRecord<'a>>> = BTreeMap::new();
    for record in records {
        groups
            .entry(minute_key(&record.instant))
            .or_default()
            .push(record);
    }

    let skip = groups.len().saturating_sub(window_count);
    debug!(minutes = groups.len(), dropped = skip, "bucketed calls by minute");

    groups
        .into_iter()
        .skip(skip)
        .map(|(key, records)| MinuteBucket { key, records })
        .collect()
}
