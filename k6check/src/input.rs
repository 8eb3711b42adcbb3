use std::path::Path;

use anyhow::Context as _;
use tokio::io::{AsyncBufReadExt as _, BufReader};

use k6check_metrics::{Point, REQUEST_METRIC, Summary, parse_point_line, parse_summary};

use crate::run_error::RunError;

/// Read and parse the end-of-test summary. A malformed document is fatal;
/// there is no partial report without the aggregate counters.
pub(crate) async fn read_summary(path: &Path) -> Result<Summary, RunError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read summary: {}", path.display()))
        .map_err(RunError::RuntimeError)?;

    parse_summary(&raw)
        .with_context(|| format!("failed to parse summary: {}", path.display()))
        .map_err(RunError::InvalidInput)
}

/// Read the NDJSON results log, keeping only request points. Lines that do
/// not parse are dropped; the log is append-only and a truncated tail is
/// expected, so only IO failures are errors.
pub(crate) async fn read_points(path: &Path) -> Result<Vec<Point>, RunError> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open results log: {}", path.display()))
        .map_err(RunError::RuntimeError)?;

    let mut lines = BufReader::new(file).lines();
    let mut points = Vec::new();

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("failed to read results log: {}", path.display()))
        .map_err(RunError::RuntimeError)?
    {
        if let Some(point) = parse_point_line(&line, REQUEST_METRIC) {
            points.push(point);
        }
    }

    Ok(points)
}
