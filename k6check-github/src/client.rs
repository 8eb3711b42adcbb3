use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::Request;
use hyper::body::Incoming;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use std::time::Duration;

use super::{CheckRun, Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("k6check/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ChecksConfig {
    /// API base url; override for GitHub Enterprise or a local test server.
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
    /// Per-call deadline covering the whole request/response exchange.
    pub request_timeout: Option<Duration>,
}

impl ChecksConfig {
    #[must_use]
    pub fn new(owner: String, repo: String, token: String) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner,
            repo,
            token,
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// GitHub Checks API client. Publishing is a single POST; retries, if any,
/// belong to the caller's CI environment, not here.
#[derive(Debug, Clone)]
pub struct ChecksClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ChecksConfig,
}

#[derive(Debug, Deserialize)]
struct CheckRunCreated {
    html_url: Option<String>,
}

impl ChecksClient {
    #[must_use]
    pub fn new(config: ChecksConfig) -> Self {
        // The OS-level TCP connect timeout can be very long (tens of seconds);
        // apply a sane default so unreachable endpoints surface promptly.
        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_connect_timeout(Some(Duration::from_secs(3)));

        let https_connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let inner = Client::builder(TokioExecutor::new()).build(https_connector);

        Self { inner, config }
    }

    /// Create a check run and return its `html_url`.
    ///
    /// # Errors
    ///
    /// Transport and serialization failures map to the corresponding
    /// [`Error`] variants; a non-201 response surfaces as [`Error::Api`] with
    /// the response body attached so auth/permission problems stay readable.
    pub async fn create_check_run(&self, check: &CheckRun) -> Result<String> {
        let uri = self.endpoint_uri()?;
        let body = serde_json::to_vec(check)?;

        let req: Request<Full<Bytes>> = Request::builder()
            .method(http::Method::POST)
            .uri(uri)
            .header(http::header::AUTHORIZATION, self.bearer()?)
            .header(http::header::ACCEPT, "application/vnd.github+json")
            .header(http::header::CONTENT_TYPE, "application/json")
            .header(http::header::USER_AGENT, USER_AGENT)
            .header("x-github-api-version", API_VERSION)
            .body(Full::new(Bytes::from(body)))?;

        let res: hyper::Response<Incoming> = match self.config.request_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, self.inner.request(req)).await {
                Ok(res) => res?,
                Err(_) => return Err(Error::Timeout(timeout)),
            },
            None => self.inner.request(req).await?,
        };

        let status = res.status();
        let body = res.into_body().collect().await?.to_bytes();

        if status != http::StatusCode::CREATED {
            return Err(Error::Api {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let created: CheckRunCreated = serde_json::from_slice(&body)?;
        created.html_url.ok_or(Error::MissingHtmlUrl)
    }

    fn endpoint_uri(&self) -> Result<hyper::Uri> {
        let base = url::Url::parse(&self.config.api_url)
            .map_err(|_| Error::InvalidApiUrl(self.config.api_url.clone()))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(Error::UnsupportedScheme(self.config.api_url.clone()));
        }

        let endpoint = format!(
            "{}/repos/{}/{}/check-runs",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        );

        endpoint
            .parse()
            .map_err(|_| Error::InvalidApiUrl(endpoint))
    }

    fn bearer(&self) -> Result<http::HeaderValue> {
        let mut value = http::HeaderValue::from_str(&format!("Bearer {}", self.config.token))?;
        value.set_sensitive(true);
        Ok(value)
    }
}
