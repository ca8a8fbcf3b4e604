//! HTTP access to IMDB and the list-rendering service
//!
//! Every outbound call goes through the [`Upstream`] trait so the resolver,
//! catalog proxy and manifest builder can be exercised without a network.
//! Headers are built per request; nothing is shared between calls.
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, REFERER, USER_AGENT};
use reqwest::Client as HttpClient;

use crate::error::{AppError, AppResult};

/// Browser user agent sent with every upstream request
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 8.0.0; TA-1053 Build/OPR1.170623.026) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/67.0.3368.0 Mobile Safari/537.36";

/// A single outbound GET
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub url: String,
    pub headers: HeaderMap,
}

impl UpstreamRequest {
    /// GET request carrying the fixed browser user agent
    pub fn get(url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        Self {
            url: url.into(),
            headers,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> AppResult<Self> {
        let value = HeaderValue::from_str(value).map_err(|e| {
            AppError::Validation(format!("Invalid {} header value: {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_referer(self, referer: &str) -> AppResult<Self> {
        self.with_header(REFERER, referer)
    }
}

/// Source of upstream response bodies
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Upstream: Send + Sync {
    /// Performs the request and returns the response body as text
    ///
    /// Transport failures and non-success statuses are `AppError::Fetch`.
    /// An empty body is returned as-is; callers decide what it means.
    async fn get_text(&self, request: UpstreamRequest) -> AppResult<String>;
}

/// [`Upstream`] backed by a shared reqwest client
#[derive(Clone, Default)]
pub struct HttpUpstream {
    http_client: HttpClient,
}

impl HttpUpstream {
    pub fn new() -> Self {
        Self {
            http_client: HttpClient::new(),
        }
    }
}

#[async_trait::async_trait]
impl Upstream for HttpUpstream {
    async fn get_text(&self, request: UpstreamRequest) -> AppResult<String> {
        tracing::debug!(url = %request.url, "Upstream request");

        let response = self
            .http_client
            .get(&request.url)
            .headers(request.headers)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Fetch(format!(
                "{} returned status {}",
                request.url, status
            )));
        }

        Ok(response.text().await?)
    }
}
