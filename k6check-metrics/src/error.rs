/// Failure to parse the end-of-test summary document.
///
/// There is no partial-summary mode: a document that does not decode into the
/// expected metric shapes aborts the whole run.
#[derive(Debug, thiserror::Error)]
pub enum SummaryParseError {
    #[error("invalid summary document: {0}")]
    Json(#[from] serde_json::Error),
}
