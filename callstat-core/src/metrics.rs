use std::collections::HashSet;

use callstat_classifier::OutcomeClassifier;
use callstat_types::BucketMetrics;

use crate::bucket::MinuteBucket;

/// Round to two decimals on the exact binary value, the way the dialer's own
/// reports do. Scaling by 100 first would manufacture ties (`2.225` is really
/// `2.22500000000000008...`).
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// `numerator / denominator`, with division by zero defined as 0.0.
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Metrics for one bucket; `None` for an empty bucket, which is never rendered.
pub fn compute_metrics(
    bucket: &MinuteBucket<'_>,
    classifier: &OutcomeClassifier,
) -> Option<BucketMetrics> {
    let total = bucket.records.len();
    if total == 0 {
        return None;
    }

    let answering_machine_count = bucket
        .records
        .iter()
        .filter(|r| classifier.is_answering_machine(r.record.outcome))
        .count();
    let silence_count = bucket
        .records
        .iter()
        .filter(|r| classifier.is_silence(r.record.outcome))
        .count();
    let distinct_actors = bucket
        .records
        .iter()
        .filter_map(|r| r.record.actor)
        .collect::<HashSet<&str>>()
        .len();

    Some(BucketMetrics {
        minute: bucket.key.clone(),
        total,
        answering_machine_count,
        silence_count,
        distinct_actors,
        avg_calls_per_actor: round2(ratio(total, distinct_actors)),
        pct_answering_machine: round2(ratio(answering_machine_count, total) * 100.0),
        pct_silence: round2(ratio(silence_count, total) * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use callstat_types::{CallRecord, TimeValue};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::*;
    use crate::filter::TimedRecord;

    fn bucket<'a>(rows: &[(Option<&'a str>, Option<&'a str>)]) -> MinuteBucket<'a> {
        let instant = NaiveDate::default().and_hms_opt(9, 15, 2).unwrap();
        MinuteBucket {
            key: "09:15".into(),
            records: rows
                .iter()
                .map(|&(actor, outcome)| TimedRecord {
                    record: CallRecord {
                        actor,
                        time: TimeValue::Missing,
                        outcome,
                    },
                    instant,
                })
                .collect(),
        }
    }

    #[test]
    fn mixed_bucket() {
        let b = bucket(&[
            (Some("A"), Some("Автоответчик")),
            (Some("A"), Some("Тишина")),
            (Some("B"), Some("ok")),
        ]);
        let m = compute_metrics(&b, &OutcomeClassifier::default()).unwrap();
        assert_eq!(m.minute, "09:15");
        assert_eq!(m.total, 3);
        assert_eq!(m.answering_machine_count, 1);
        assert_eq!(m.silence_count, 1);
        assert_eq!(m.distinct_actors, 2);
        assert_eq!(m.avg_calls_per_actor, 1.5);
        assert_eq!(m.pct_answering_machine, 33.33);
        assert_eq!(m.pct_silence, 33.33);
    }

    #[test]
    fn rows_without_actor_average_to_zero() {
        let b = bucket(&[(None, Some("ok")), (None, None)]);
        let m = compute_metrics(&b, &OutcomeClassifier::default()).unwrap();
        assert_eq!(m.distinct_actors, 0);
        assert_eq!(m.avg_calls_per_actor, 0.0);
        assert_eq!(m.pct_answering_machine, 0.0);
    }

    #[test]
    fn empty_bucket_has_no_metrics() {
        assert!(compute_metrics(&bucket(&[]), &OutcomeClassifier::default()).is_none());
    }

    #[test]
    fn rounding_uses_the_exact_value() {
        // 89/40 is stored just above 2.225, 131/40 just below 3.275
        assert_eq!(round2(89.0 / 40.0), 2.23);
        assert_eq!(round2(131.0 / 40.0), 3.27);
        assert_eq!(round2(200.0 / 3.0), 66.67);
        assert_eq!(round2(100.0), 100.0);
    }

    #[test]
    fn average_over_forty_agents() {
        let rows: Vec<(Option<&str>, Option<&str>)> = (0..89)
            .map(|i| (Some(AGENTS[i % 40]), Some("ok")))
            .collect();
        let m = compute_metrics(&bucket(&rows), &OutcomeClassifier::default()).unwrap();
        assert_eq!(m.distinct_actors, 40);
        assert_eq!(m.avg_calls_per_actor, 2.23);
    }

    const AGENTS: [&str; 40] = [
        "a00", "a01", "a02", "a03", "a04", "a05", "a06", "a07", "a08", "a09", "a10", "a11", "a12",
        "a13", "a14", "a15", "a16", "a17", "a18", "a19", "a20", "a21", "a22", "a23", "a24", "a25",
        "a26", "a27", "a28", "a29", "a30", "a31", "a32", "a33", "a34", "a35", "a36", "a37", "a38",
        "a39",
    ];

    fn outcome() -> impl Strategy<Value = Option<&'static str>> {
        prop_oneof![
            Just(None),
            Just(Some("Автоответчик")),
            Just(Some("Обнаружен автоответчик (системный)")),
            Just(Some("Тишина")),
            Just(Some("Разговор")),
        ]
    }

    fn actor() -> impl Strategy<Value = Option<&'static str>> {
        prop_oneof![Just(None), Just(Some("A")), Just(Some("B")), Just(Some("C"))]
    }

    proptest! {
        #[test]
        fn metrics_stay_in_bounds(rows in prop::collection::vec((actor(), outcome()), 1..60)) {
            let b = bucket(&rows);
            let m = compute_metrics(&b, &OutcomeClassifier::default()).unwrap();
            prop_assert_eq!(m.total, rows.len());
            prop_assert!(m.answering_machine_count <= m.total);
            prop_assert!(m.silence_count <= m.total);
            prop_assert!(m.answering_machine_count + m.silence_count <= m.total);
            prop_assert!((0.0..=100.0).contains(&m.pct_answering_machine));
            prop_assert!((0.0..=100.0).contains(&m.pct_silence));
            prop_assert!(m.avg_calls_per_actor >= 0.0);
            prop_assert!(m.distinct_actors <= 3);
        }
    }
}
