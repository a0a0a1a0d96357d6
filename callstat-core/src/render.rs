use callstat_types::{BucketMetrics, ReportType};

/// Report text when every row was excluded or had no usable time.
pub const NO_DATA_AFTER_FILTERING: &str = "no data after filtering.";

pub fn no_recent_data(window_count: usize) -> String {
    format!("no data in the last {window_count} minutes.")
}

/// Shortest float form, keeping `.0` on integral values (`1.5`, `33.33`, `100.0`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// One bucket block. The AO rate is the only emphasized line (`<b>`, the
/// chat transport's markup).
pub fn render_block(m: &BucketMetrics, report_type: ReportType) -> String {
    let mut block = format!(
        "Statistics from {minute} to {minute}\n- Calls: {total}\n",
        minute = m.minute,
        total = m.total
    );
    if report_type.shows_counts() {
        block.push_str(&format!("- AO: {}\n", m.answering_machine_count));
        block.push_str(&format!("- Silence: {}\n", m.silence_count));
    }
    if report_type.shows_answering_machine() {
        block.push_str(&format!(
            "- <b>AO rate: {}%</b>\n",
            format_number(m.pct_answering_machine)
        ));
    }
    if report_type.shows_silence() {
        block.push_str(&format!(
            "- Silence rate: {}%\n",
            format_number(m.pct_silence)
        ));
    }
    if report_type.shows_counts() {
        block.push_str(&format!(
            "- Avg calls per employee: {}\n",
            format_number(m.avg_calls_per_actor)
        ));
    }
    block
}

/// Render all buckets, blank line between blocks, trimmed.
///
/// `report_type` is `None` when the caller asked for a tag outside the known
/// set; that renders no blocks and falls through to the no-data sentence.
pub fn render_report(
    metrics: &[BucketMetrics],
    report_type: Option<ReportType>,
    window_count: usize,
) -> String {
    let blocks: Vec<String> = match report_type {
        Some(t) => metrics.iter().map(|m| render_block(m, t)).collect(),
        None => Vec::new(),
    };
    let text = blocks.join("\n");
    let text = text.trim();
    if text.is_empty() {
        no_recent_data(window_count)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(minute: &str) -> BucketMetrics {
        BucketMetrics {
            minute: minute.into(),
            total: 3,
            answering_machine_count: 1,
            silence_count: 1,
            distinct_actors: 2,
            avg_calls_per_actor: 1.5,
            pct_answering_machine: 33.33,
            pct_silence: 33.33,
        }
    }

    #[test]
    fn numbers_print_like_the_dialer() {
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(33.33), "33.33");
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(100.0), "100.0");
        assert_eq!(format_number(2.0), "2.0");
    }

    #[test]
    fn full_block() {
        assert_eq!(
            render_block(&sample("09:15"), ReportType::Full),
            "Statistics from 09:15 to 09:15\n\
             - Calls: 3\n\
             - AO: 1\n\
             - Silence: 1\n\
             - <b>AO rate: 33.33%</b>\n\
             - Silence rate: 33.33%\n\
             - Avg calls per employee: 1.5\n"
        );
    }

    #[test]
    fn ao_only_block() {
        assert_eq!(
            render_block(&sample("09:15"), ReportType::AoOnly),
            "Statistics from 09:15 to 09:15\n- Calls: 3\n- <b>AO rate: 33.33%</b>\n"
        );
    }

    #[test]
    fn silence_only_block() {
        assert_eq!(
            render_block(&sample("09:15"), ReportType::SilenceOnly),
            "Statistics from 09:15 to 09:15\n- Calls: 3\n- Silence rate: 33.33%\n"
        );
    }

    #[test]
    fn ao_silence_block() {
        assert_eq!(
            render_block(&sample("09:15"), ReportType::AoSilence),
            "Statistics from 09:15 to 09:15\n\
             - Calls: 3\n\
             - <b>AO rate: 33.33%</b>\n\
             - Silence rate: 33.33%\n"
        );
    }

    #[test]
    fn blocks_are_separated_by_a_blank_line_and_trimmed() {
        let report = render_report(
            &[sample("09:15"), sample("09:16")],
            Some(ReportType::AoOnly),
            10,
        );
        assert_eq!(
            report,
            "Statistics from 09:15 to 09:15\n- Calls: 3\n- <b>AO rate: 33.33%</b>\n\n\
             Statistics from 09:16 to 09:16\n- Calls: 3\n- <b>AO rate: 33.33%</b>"
        );
    }

    #[test]
    fn no_blocks_means_no_recent_data() {
        assert_eq!(
            render_report(&[], Some(ReportType::Full), 10),
            "no data in the last 10 minutes."
        );
        assert_eq!(render_report(&[sample("09:15")], None, 10), "no data in the last 10 minutes.");
    }

    #[test]
    fn rendering_is_deterministic() {
        let metrics = vec![sample("09:15"), sample("09:16")];
        for t in ReportType::ALL {
            assert_eq!(
                render_report(&metrics, Some(t), 10),
                render_report(&metrics, Some(t), 10)
            );
        }
    }
}
