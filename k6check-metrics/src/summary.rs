use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::SummaryParseError;

/// Name prefix of the dynamically-created per-status-code counters
/// (`http_status_200`, `http_status_404`, ...).
pub const HTTP_STATUS_PREFIX: &str = "http_status_";

/// Statistical summary of a continuous measurement across the run.
/// All values are durations in fractional milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trend {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub med: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Monotonic total plus the derived per-second rate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Counter {
    pub count: f64,
    pub rate: f64,
}

/// Instantaneous value with observed bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Gauge {
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

/// Pass/fail ratio metric (`http_req_failed`) with auxiliary absolute counts.
///
/// The source data does not say on the wire whether `value` is the fraction
/// that failed or the fraction that passed; the report layer takes that as an
/// explicit convention and never guesses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestOutcome {
    pub fails: u64,
    pub passes: u64,
    pub value: f64,
}

/// Parsed end-of-test summary: the fixed metric set plus the per-status-code
/// counter family discovered by the [`HTTP_STATUS_PREFIX`] naming convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub http_reqs: Counter,
    pub http_req_failed: RequestOutcome,
    pub vus: Gauge,
    pub iterations: Counter,
    pub data_sent: Counter,
    pub data_received: Counter,

    pub http_req_blocked: Trend,
    pub http_req_connecting: Trend,
    pub http_req_tls_handshaking: Option<Trend>,
    pub http_req_duration: Option<Trend>,
    pub http_req_sending: Option<Trend>,
    pub http_req_waiting: Option<Trend>,
    pub http_req_receiving: Option<Trend>,

    /// Per-status-code request counters, keyed by numeric status code so that
    /// iteration order is numeric ascending (9 before 10 before 200).
    pub http_status: BTreeMap<u16, Counter>,

    /// Prefix-matched keys whose suffix or value did not parse. Excluded from
    /// the report; the caller may log them.
    pub invalid_status_keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawSummary {
    metrics: RawMetrics,
}

#[derive(Debug, Deserialize)]
struct RawMetrics {
    http_reqs: Counter,
    http_req_failed: RequestOutcome,
    vus: Gauge,
    iterations: Counter,
    data_sent: Counter,
    data_received: Counter,

    http_req_blocked: Trend,
    http_req_connecting: Trend,
    http_req_tls_handshaking: Option<Trend>,
    http_req_duration: Option<Trend>,
    http_req_sending: Option<Trend>,
    http_req_waiting: Option<Trend>,
    http_req_receiving: Option<Trend>,

    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

/// Rewrite the decorated percentile key spellings (`"p(90)"`, `"p(95)"`) to
/// the plain ones before structural parsing.
///
/// The search is scoped to the two exact quoted tokens; nothing else in the
/// document can match, so numeric content elsewhere is never touched.
#[must_use]
pub fn normalize_percentile_keys(raw: &str) -> String {
    raw.replace("\"p(90)\"", "\"p90\"")
        .replace("\"p(95)\"", "\"p95\"")
}

/// Parse the raw summary-export document.
///
/// # Errors
///
/// Returns [`SummaryParseError`] when the document (after percentile-key
/// normalization) is not valid JSON or lacks a required metric.
pub fn parse_summary(raw: &str) -> Result<Summary, SummaryParseError> {
    let normalized = normalize_percentile_keys(raw);
    let doc: RawSummary = serde_json::from_str(&normalized)?;
    Ok(Summary::from_raw(doc.metrics))
}

impl Summary {
    fn from_raw(raw: RawMetrics) -> Self {
        let mut http_status = BTreeMap::new();
        let mut invalid_status_keys = Vec::new();

        for (key, value) in raw.extra {
            let Some(suffix) = key.strip_prefix(HTTP_STATUS_PREFIX) else {
                // Metrics outside the report's scope (vus_max, checks, ...).
                continue;
            };

            match (suffix.parse::<u16>(), serde_json::from_value::<Counter>(value)) {
                (Ok(code), Ok(counter)) => {
                    http_status.insert(code, counter);
                }
                _ => invalid_status_keys.push(key),
            }
        }

        Self {
            http_reqs: raw.http_reqs,
            http_req_failed: raw.http_req_failed,
            vus: raw.vus,
            iterations: raw.iterations,
            data_sent: raw.data_sent,
            data_received: raw.data_received,
            http_req_blocked: raw.http_req_blocked,
            http_req_connecting: raw.http_req_connecting,
            http_req_tls_handshaking: raw.http_req_tls_handshaking,
            http_req_duration: raw.http_req_duration,
            http_req_sending: raw.http_req_sending,
            http_req_waiting: raw.http_req_waiting,
            http_req_receiving: raw.http_req_receiving,
            http_status,
            invalid_status_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    const TREND: &str = r#"{"min":1.0,"max":9.0,"avg":4.0,"med":3.5,"p90":8.0,"p95":8.5}"#;

    fn summary_json(extra_metrics: &str) -> String {
        format!(
            r#"{{"metrics":{{
                "http_reqs":{{"count":100,"rate":10.5}},
                "http_req_failed":{{"fails":3,"passes":97,"value":0.03}},
                "vus":{{"value":25,"min":1,"max":25}},
                "iterations":{{"count":50,"rate":5.0}},
                "data_sent":{{"count":2048,"rate":204.8}},
                "data_received":{{"count":409600,"rate":40960.0}},
                "http_req_blocked":{TREND},
                "http_req_connecting":{TREND}
                {extra_metrics}
            }}}}"#
        )
    }

    #[test]
    fn parses_fixed_metrics() {
        let summary = parse_summary(&summary_json("")).unwrap();

        assert_eq!(summary.http_reqs.count, 100.0);
        assert_eq!(summary.http_reqs.rate, 10.5);
        assert_eq!(summary.http_req_failed.fails, 3);
        assert_eq!(summary.http_req_failed.passes, 97);
        assert_eq!(summary.vus.value, 25.0);
        assert_eq!(summary.http_req_blocked.p95, 8.5);
        assert!(summary.http_req_duration.is_none());
        assert!(summary.http_status.is_empty());
        assert!(summary.invalid_status_keys.is_empty());
    }

    #[test]
    fn decorated_and_plain_percentile_spellings_parse_identically() {
        let plain = summary_json("");
        let decorated = plain.replace("\"p90\"", "\"p(90)\"").replace("\"p95\"", "\"p(95)\"");
        assert_ne!(plain, decorated);

        let a = parse_summary(&plain).unwrap();
        let b = parse_summary(&decorated).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn normalization_only_touches_the_quoted_tokens() {
        let raw = r#"{"note":"p(90) appears in prose","p(90)":1}"#;
        let normalized = normalize_percentile_keys(raw);
        // The bare prose occurrence is not a quoted key token and survives.
        assert_eq!(normalized, r#"{"note":"p(90) appears in prose","p90":1}"#);
    }

    #[test]
    fn status_counters_are_keyed_numerically() {
        let summary = parse_summary(&summary_json(
            r#",
            "http_status_404":{"count":4,"rate":0.4},
            "http_status_10":{"count":1,"rate":0.1},
            "http_status_200":{"count":90,"rate":9.0},
            "http_status_9":{"count":5,"rate":0.5}"#,
        ))
        .unwrap();

        let codes: Vec<u16> = summary.http_status.keys().copied().collect();
        assert_eq!(codes, vec![9, 10, 200, 404]);
        assert_eq!(summary.http_status[&200].count, 90.0);
    }

    #[test]
    fn unparsable_status_keys_are_excluded_and_reported() {
        let summary = parse_summary(&summary_json(
            r#",
            "http_status_200":{"count":90,"rate":9.0},
            "http_status_abc":{"count":1,"rate":0.1},
            "http_status_500":"not a counter""#,
        ))
        .unwrap();

        let codes: Vec<u16> = summary.http_status.keys().copied().collect();
        assert_eq!(codes, vec![200]);

        let mut invalid = summary.invalid_status_keys.clone();
        invalid.sort();
        assert_eq!(invalid, vec!["http_status_500", "http_status_abc"]);
    }

    #[test]
    fn non_status_extra_metrics_are_ignored() {
        let summary = parse_summary(&summary_json(
            r#",
            "vus_max":{"value":25,"min":25,"max":25},
            "iteration_duration":{"min":1,"max":2,"avg":1.5,"med":1.5,"p90":2,"p95":2}"#,
        ))
        .unwrap();

        assert!(summary.http_status.is_empty());
        assert!(summary.invalid_status_keys.is_empty());
    }

    #[test]
    fn optional_trends_parse_when_present() {
        let summary = parse_summary(&summary_json(&format!(
            r#","http_req_duration":{TREND},"http_req_tls_handshaking":{TREND}"#
        )))
        .unwrap();

        assert!(summary.http_req_duration.is_some());
        assert!(summary.http_req_tls_handshaking.is_some());
        assert!(summary.http_req_sending.is_none());
    }

    #[test]
    fn missing_required_metric_is_fatal() {
        let raw = r#"{"metrics":{"http_reqs":{"count":1,"rate":1.0}}}"#;
        assert!(parse_summary(raw).is_err());
    }

    #[test]
    fn malformed_document_is_fatal() {
        assert!(parse_summary("not json at all").is_err());
    }
}
