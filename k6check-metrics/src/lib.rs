#![forbid(unsafe_code)]

mod error;
mod point;
mod summary;

pub use error::SummaryParseError;
pub use point::{POINT_TYPE, Point, PointData, PointTags, REQUEST_METRIC, parse_point_line};
pub use summary::{
    Counter, Gauge, HTTP_STATUS_PREFIX, RequestOutcome, Summary, Trend, normalize_percentile_keys,
    parse_summary,
};
