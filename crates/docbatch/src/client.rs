//! HTTP client for the batch service

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    DEFAULT_BASE_URL,
    config::{ClientConfig, RateLimitConfig},
    error::{Error, Result},
    http::RequestBuilder,
    resources::{Batches, Jobs, Prompts, Results},
};

/// Client for the batch service.
///
/// Cheap to clone; clones share the connection pool and rate limiter.
/// Resource handles are built per call and hold their own clone.
///
/// # Example
///
/// ```rust,no_run
/// # async fn example() -> docbatch::Result<()> {
/// let client = docbatch::Client::new("http://localhost:8000")?;
/// let snapshot = client.batches().get("b-1").await?;
/// println!("{} of {} done", snapshot.completed_jobs, snapshot.total_jobs);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    auth_token: Option<SecretString>,
    timeout: Duration,
    max_retries: u32,
    default_headers: http::HeaderMap,
    rate_limiter: Option<DefaultDirectRateLimiter>,
}

impl Client {
    /// Create a client for the service at `base_url` with default settings.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder for advanced configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from the `DOCBATCH_*` environment variables.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Create a client from a configuration object.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut client_builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("docbatch/{}", crate::VERSION))
            .pool_max_idle_per_host(config.connection_pool.max_idle_per_host)
            .pool_idle_timeout(config.connection_pool.idle_timeout);

        if let Some(keepalive) = config.connection_pool.tcp_keepalive {
            client_builder = client_builder.tcp_keepalive(Some(keepalive));
        }

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| Error::HttpClient(format!("Invalid proxy URL: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let http_client = client_builder
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))?;

        let base_url = parse_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let rate_limiter = config.rate_limit.as_ref().map(build_rate_limiter);

        tracing::debug!(base_url = %base_url, rate_limited = rate_limiter.is_some(), "Created client");

        let inner = Arc::new(ClientInner {
            http_client,
            base_url,
            auth_token: config.auth_token,
            timeout: config.timeout,
            max_retries: config.max_retries,
            default_headers: config.default_headers,
            rate_limiter,
        });

        Ok(Self { inner })
    }

    /// Batch submission and status.
    pub fn batches(&self) -> Batches {
        Batches::new(self.clone())
    }

    /// Job result detail.
    pub fn jobs(&self) -> Jobs {
        Jobs::new(self.clone())
    }

    /// Prompt catalogue.
    pub fn prompts(&self) -> Prompts {
        Prompts::new(self.clone())
    }

    /// Stored results.
    pub fn results(&self) -> Results {
        Results::new(self.clone())
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Wait until the client-side rate limiter admits one more request.
    pub(crate) async fn apply_rate_limit(&self) {
        if let Some(limiter) = &self.inner.rate_limiter {
            limiter.until_ready().await;
        }
    }

    /// Build a request for `path`, relative to the base URL.
    pub(crate) fn request(&self, method: http::Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::InvalidUrl(format!("Failed to construct URL: {}", e)))?;

        let mut builder = RequestBuilder::new(method, url)
            .with_client(self.inner.http_client.clone())
            .timeout(self.inner.timeout)
            .max_retries(self.inner.max_retries)
            .typed_header(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static("application/json"),
            );

        if let Some(token) = &self.inner.auth_token {
            builder = builder.try_header("authorization", format!("Bearer {}", token.expose_secret()))?;
        }

        for (key, value) in &self.inner.default_headers {
            builder = builder.typed_header(key.clone(), value.clone());
        }

        Ok(builder)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.auth_token.is_some())
            .field("timeout", &self.inner.timeout)
            .field("max_retries", &self.inner.max_retries)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidUrl("Base URL cannot be empty".to_string()));
    }

    // Keep a trailing slash so relative joins extend the path instead of replacing it.
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url: Url = normalized
        .parse()
        .map_err(|e| Error::InvalidUrl(format!("{}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::InvalidUrl(format!(
            "Invalid URL scheme '{}'. Only 'http' and 'https' are supported.",
            scheme
        ))),
    }
}

fn build_rate_limiter(config: &RateLimitConfig) -> DefaultDirectRateLimiter {
    let per_second = NonZeroU32::new(config.requests_per_second.max(1.0) as u32).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(config.burst_size).unwrap_or(per_second);
    RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst))
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Bearer token for authenticated deployments.
    pub fn auth_token(mut self, auth_token: impl Into<String>) -> Self {
        self.config.auth_token = Some(SecretString::new(auth_token.into().into_boxed_str()));
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries for idempotent requests.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();
        let key: http::HeaderName = key_str
            .parse()
            .map_err(|e| Error::InvalidHeaderName(format!("'{}': {}", key_str, e)))?;
        let value: http::HeaderValue = value_str
            .parse()
            .map_err(|e| Error::InvalidHeaderValue(format!("'{}': {}", value_str, e)))?;
        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Enable client-side rate limiting.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Client> {
        Client::from_config(self.config)
    }
}
