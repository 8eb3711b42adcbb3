use std::collections::BTreeMap;
use std::fmt::Write as _;

use k6check_metrics::{Point, RequestOutcome, Summary, Trend};

mod format;

use format::{format_bytes, format_duration_ms, round_decimals};

/// Contract for the `http_req_failed` metric. The wire format admits two
/// incompatible readings; the caller picks one explicitly (see the CLI
/// `--outcome` flag) and the builder never guesses from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutcomeConvention {
    /// `value` is the fraction of requests that failed; `fails` is the
    /// failed-request count.
    FractionFailed,
    /// `value` is the fraction of requests that passed; `passes` is the
    /// failed-request count.
    FractionPassed,
}

impl OutcomeConvention {
    fn passing_fraction(self, outcome: &RequestOutcome) -> f64 {
        match self {
            Self::FractionFailed => 1.0 - outcome.value,
            Self::FractionPassed => outcome.value,
        }
    }

    fn failed_count(self, outcome: &RequestOutcome) -> u64 {
        match self {
            Self::FractionFailed => outcome.fails,
            Self::FractionPassed => outcome.passes,
        }
    }
}

/// Short-form summary: virtual users, iterations, and data volume.
pub(crate) fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();

    writeln!(
        out,
        "Active Virtual Users Simulated: {}",
        summary.vus.value
    )
    .ok();
    writeln!(
        out,
        "Iterations (aggregate number of times the script was executed): {}",
        summary.iterations.count
    )
    .ok();
    writeln!(
        out,
        "Data Sent: {} ({}/s)",
        format_bytes(summary.data_sent.count),
        format_bytes(summary.data_sent.rate)
    )
    .ok();
    writeln!(
        out,
        "Data Received: {} ({}/s)",
        format_bytes(summary.data_received.count),
        format_bytes(summary.data_received.rate)
    )
    .ok();

    out
}

/// Full markdown report: overview table (with per-status rows), connection
/// metrics table, and — when request points are supplied — the per-status URL
/// breakdown.
pub(crate) fn render_report(
    summary: &Summary,
    points: Option<&[Point]>,
    convention: OutcomeConvention,
) -> String {
    let mut out = String::new();

    render_overview_table(summary, convention, &mut out);
    render_trend_table(summary, &mut out);

    if let Some(points) = points {
        render_status_summaries(points, &mut out);
    }

    out
}

fn render_overview_table(summary: &Summary, convention: OutcomeConvention, out: &mut String) {
    out.push_str("| Metric | Value |\n");
    out.push_str("| --- | --- |\n");

    writeln!(
        out,
        "| Total HTTP Requests | {} ({} request/s) |",
        summary.http_reqs.count,
        round_decimals(summary.http_reqs.rate, 2)
    )
    .ok();

    let outcome = &summary.http_req_failed;
    writeln!(
        out,
        "| Passing Request Rate | {}% ({} failed requests) |",
        round_decimals(convention.passing_fraction(outcome) * 100.0, 2),
        convention.failed_count(outcome)
    )
    .ok();

    // Numeric ascending order falls out of the integer-keyed map.
    for (code, counter) in &summary.http_status {
        writeln!(out, "| HTTP Status {code} | {} |", counter.count).ok();
    }
}

fn render_trend_table(summary: &Summary, out: &mut String) {
    out.push_str("\n## HTTP Connection Metrics\n");
    out.push_str(
        "| Metric | Average | Minimum | Median | Maximum | 90th Percentile | 95th Percentile |\n",
    );
    out.push_str(
        "| ------ | ------- | ------- | ------ | ------- | --------------- | --------------- |\n",
    );

    let rows: [(&str, Option<&Trend>); 7] = [
        (
            "Time Spent Blocked (waiting for TCP connection slot)",
            Some(&summary.http_req_blocked),
        ),
        (
            "Time Spent Connecting (establishing TCP connection to host)",
            Some(&summary.http_req_connecting),
        ),
        ("TLS Handshake", summary.http_req_tls_handshaking.as_ref()),
        (
            "Request Duration (sending + waiting + receiving)",
            summary.http_req_duration.as_ref(),
        ),
        (
            "Sending (time spent sending data to remote host)",
            summary.http_req_sending.as_ref(),
        ),
        (
            "Waiting (time spent waiting for response from remote host)",
            summary.http_req_waiting.as_ref(),
        ),
        (
            "Receiving (time spent receiving response data from remote host)",
            summary.http_req_receiving.as_ref(),
        ),
    ];

    for (label, trend) in rows {
        // Trends absent from this deployment variant simply have no row.
        let Some(t) = trend else { continue };
        writeln!(
            out,
            "| {label} | {} | {} | {} | {} | {} | {} |",
            format_duration_ms(t.avg),
            format_duration_ms(t.min),
            format_duration_ms(t.med),
            format_duration_ms(t.max),
            format_duration_ms(t.p90),
            format_duration_ms(t.p95)
        )
        .ok();
    }
}

fn render_status_summaries(points: &[Point], out: &mut String) {
    let mut groups: BTreeMap<u16, Vec<&str>> = BTreeMap::new();
    for point in points {
        // Points without a numeric status tag cannot be grouped; drop them.
        let Some(code) = point.status_code() else {
            continue;
        };
        groups.entry(code).or_default().push(point.url());
    }

    if groups.is_empty() {
        return;
    }

    out.push_str("\n## HTTP Status Summaries\n");
    for (code, urls) in groups {
        writeln!(out, "\n### HTTP Status {code} ({} requests)", urls.len()).ok();
        for url in urls {
            writeln!(out, "- {url}").ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k6check_metrics::{Counter, Gauge, PointData, PointTags};

    fn counter(count: f64, rate: f64) -> Counter {
        Counter { count, rate }
    }

    fn trend(avg: f64) -> Trend {
        Trend {
            min: 0.0,
            max: avg * 2.0,
            avg,
            med: avg,
            p90: avg * 1.5,
            p95: avg * 1.8,
        }
    }

    fn zero_summary() -> Summary {
        Summary {
            http_reqs: counter(0.0, 0.0),
            http_req_failed: RequestOutcome {
                fails: 0,
                passes: 0,
                value: 0.0,
            },
            vus: Gauge {
                value: 0.0,
                min: 0.0,
                max: 0.0,
            },
            iterations: counter(0.0, 0.0),
            data_sent: counter(0.0, 0.0),
            data_received: counter(0.0, 0.0),
            http_req_blocked: trend(0.0),
            http_req_connecting: trend(0.0),
            http_req_tls_handshaking: None,
            http_req_duration: None,
            http_req_sending: None,
            http_req_waiting: None,
            http_req_receiving: None,
            http_status: BTreeMap::new(),
            invalid_status_keys: Vec::new(),
        }
    }

    fn point(status: &str, url: &str) -> Point {
        Point {
            kind: "Point".to_string(),
            metric: "http_reqs".to_string(),
            data: PointData {
                value: 1.0,
                tags: PointTags {
                    status: status.to_string(),
                    url: url.to_string(),
                },
            },
        }
    }

    fn index_of(haystack: &str, needle: &str) -> usize {
        match haystack.find(needle) {
            Some(idx) => idx,
            None => panic!("expected {needle:?} in:\n{haystack}"),
        }
    }

    #[test]
    fn all_zero_summary_renders_zero_requests_row() {
        let report = render_report(&zero_summary(), None, OutcomeConvention::FractionFailed);
        assert!(report.contains("| Total HTTP Requests | 0 (0 request/s) |"));
        assert!(report.contains("| Passing Request Rate | 100% (0 failed requests) |"));
    }

    #[test]
    fn short_summary_lists_vus_iterations_and_data() {
        let mut summary = zero_summary();
        summary.vus.value = 25.0;
        summary.iterations = counter(50.0, 5.0);
        summary.data_sent = counter(2048.0, 204.8);
        summary.data_received = counter(2_500_000.0, 250_000.0);

        let text = render_summary(&summary);
        assert!(text.contains("Active Virtual Users Simulated: 25"));
        assert!(text.contains("script was executed): 50"));
        assert!(text.contains("Data Sent: 2 kB (204.8 B/s)"));
        assert!(text.contains("Data Received: 2.5 MB (250 kB/s)"));
    }

    #[test]
    fn status_rows_sort_numerically_not_lexicographically() {
        let mut summary = zero_summary();
        for code in [200u16, 404, 9, 10] {
            summary.http_status.insert(code, counter(1.0, 0.1));
        }

        let report = render_report(&summary, None, OutcomeConvention::FractionFailed);
        let at_9 = index_of(&report, "| HTTP Status 9 |");
        let at_10 = index_of(&report, "| HTTP Status 10 |");
        let at_200 = index_of(&report, "| HTTP Status 200 |");
        let at_404 = index_of(&report, "| HTTP Status 404 |");
        assert!(at_9 < at_10 && at_10 < at_200 && at_200 < at_404);
    }

    #[test]
    fn empty_status_set_adds_no_rows() {
        let report = render_report(&zero_summary(), None, OutcomeConvention::FractionFailed);
        assert!(!report.contains("| HTTP Status "));
    }

    #[test]
    fn passing_rate_rounds_half_up_at_two_decimals() {
        let mut summary = zero_summary();
        summary.http_req_failed = RequestOutcome {
            fails: 12,
            passes: 21,
            value: 0.123456,
        };

        let report = render_report(&summary, None, OutcomeConvention::FractionPassed);
        assert!(report.contains("| Passing Request Rate | 12.35% (21 failed requests) |"));
    }

    #[test]
    fn passing_rate_keeps_exact_decimal_ties() {
        let mut summary = zero_summary();
        summary.http_req_failed = RequestOutcome {
            fails: 0,
            passes: 7,
            value: 0.125,
        };

        let report = render_report(&summary, None, OutcomeConvention::FractionPassed);
        assert!(report.contains("| Passing Request Rate | 12.5% (7 failed requests) |"));
    }

    #[test]
    fn fraction_failed_convention_inverts_value_and_uses_fails() {
        let mut summary = zero_summary();
        summary.http_req_failed = RequestOutcome {
            fails: 3,
            passes: 97,
            value: 0.03,
        };

        let report = render_report(&summary, None, OutcomeConvention::FractionFailed);
        assert!(report.contains("| Passing Request Rate | 97% (3 failed requests) |"));
    }

    #[test]
    fn zero_average_trend_uses_sub_millisecond_rendering() {
        let report = render_report(&zero_summary(), None, OutcomeConvention::FractionFailed);
        assert!(report.contains("| Time Spent Blocked (waiting for TCP connection slot) | 0µs |"));
    }

    #[test]
    fn seconds_scale_trend_renders_in_seconds() {
        let mut summary = zero_summary();
        summary.http_req_duration = Some(trend(1500.0));

        let report = render_report(&summary, None, OutcomeConvention::FractionFailed);
        assert!(
            report.contains("| Request Duration (sending + waiting + receiving) | 1.5s |"),
            "unexpected report:\n{report}"
        );
    }

    #[test]
    fn missing_optional_trends_have_no_rows() {
        let report = render_report(&zero_summary(), None, OutcomeConvention::FractionFailed);
        assert!(!report.contains("TLS Handshake"));
        assert!(!report.contains("Request Duration"));
        assert!(report.contains("Time Spent Blocked"));
        assert!(report.contains("Time Spent Connecting"));
    }

    #[test]
    fn status_summaries_group_by_code_preserving_encounter_order() {
        let points = vec![
            point("200", "https://example.com/a"),
            point("200", "https://example.com/b"),
            point("404", "https://example.com/missing"),
            point("500", "https://example.com/boom"),
            point("200", "https://example.com/c"),
        ];

        let report = render_report(
            &zero_summary(),
            Some(&points),
            OutcomeConvention::FractionFailed,
        );

        assert!(report.contains("## HTTP Status Summaries"));
        assert!(report.contains("### HTTP Status 200 (3 requests)"));
        assert!(report.contains("### HTTP Status 404 (1 requests)"));
        assert!(report.contains("### HTTP Status 500 (1 requests)"));

        let at_a = index_of(&report, "- https://example.com/a");
        let at_b = index_of(&report, "- https://example.com/b");
        let at_c = index_of(&report, "- https://example.com/c");
        let at_404 = index_of(&report, "### HTTP Status 404");
        assert!(at_a < at_b && at_b < at_c && at_c < at_404);
    }

    #[test]
    fn no_points_means_no_status_summaries_section() {
        let report = render_report(&zero_summary(), None, OutcomeConvention::FractionFailed);
        assert!(!report.contains("HTTP Status Summaries"));

        let report = render_report(
            &zero_summary(),
            Some(&[]),
            OutcomeConvention::FractionFailed,
        );
        assert!(!report.contains("HTTP Status Summaries"));
    }
}
