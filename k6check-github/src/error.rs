use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid GitHub API base url: {0}")]
    InvalidApiUrl(String),

    #[error("only http:// and https:// API endpoints are supported: {0}")]
    UnsupportedScheme(String),

    #[error("invalid check-run payload or response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("http request build failed: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("invalid http header value: {0}")]
    HeaderValue(#[from] http::header::InvalidHeaderValue),

    #[error("http request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("http request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read response body: {0}")]
    BodyRead(#[from] hyper::Error),

    #[error("GitHub API rejected the check run (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("GitHub API response carried no html_url")]
    MissingHtmlUrl,
}
