use serde::Deserialize;

/// Discriminant tag of per-request samples in the results log.
pub const POINT_TYPE: &str = "Point";

/// The one metric whose points feed the per-status breakdown.
pub const REQUEST_METRIC: &str = "http_reqs";

/// One logged request sample from the NDJSON results log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: String,
    pub metric: String,
    pub data: PointData,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointData {
    pub value: f64,
    #[serde(default)]
    pub tags: PointTags,
}

/// Tag bag attached to a point. The log carries more tags (method, scenario,
/// tls_version, ...); only the ones the report consumes are modeled.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PointTags {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub url: String,
}

impl Point {
    /// Numeric status code, if the status tag holds one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.data.tags.status.parse().ok()
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.data.tags.url
    }
}

/// Parse one line of the results log.
///
/// Returns the point only when the line is a valid JSON object tagged as a
/// point record for `metric`. Anything else — opaque log lines, truncated
/// trailing JSON, points for other metrics — yields `None`; the log format is
/// append-only and partial lines are expected, so rejection is never fatal.
#[must_use]
pub fn parse_point_line(line: &str, metric: &str) -> Option<Point> {
    let point: Point = serde_json::from_str(line).ok()?;
    (point.kind == POINT_TYPE && point.metric == metric).then_some(point)
}
