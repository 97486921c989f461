//! Configuration for the docbatch client and batch tracker

use http::HeaderMap;
use secrecy::SecretString;
use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of transport-level retries for idempotent requests.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default interval between batch status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Default pause between consecutive downloads in a download-all sequence.
pub const DEFAULT_DOWNLOAD_PAUSE: Duration = Duration::from_millis(300);

/// Configuration for the HTTP client.
///
/// This struct holds all the options for creating a [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token sent as `Authorization: Bearer <token>`, if the service requires one
    pub auth_token: Option<SecretString>,

    /// Base URL of the batch service
    pub base_url: Option<String>,

    /// Default timeout for requests
    pub timeout: Duration,

    /// Maximum number of retries for failed idempotent requests
    pub max_retries: u32,

    /// Custom headers to include with every request
    pub default_headers: HeaderMap,

    /// HTTP proxy URL for routing requests through a proxy server.
    ///
    /// Supports HTTP, HTTPS, and SOCKS5 proxies, e.g. `http://proxy.example.com:8080`.
    pub proxy: Option<String>,

    /// Connection pool configuration
    pub connection_pool: ConnectionPoolConfig,

    /// Client-side rate limiting configuration
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_token: None,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            default_headers: HeaderMap::new(),
            proxy: None,
            connection_pool: ConnectionPoolConfig::default(),
            rate_limit: None,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration pointing at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Default::default()
        }
    }

    /// Create a new configuration with a bearer token.
    pub fn with_auth_token(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: Some(SecretString::new(auth_token.into().into_boxed_str())),
            ..Default::default()
        }
    }

    /// Set an HTTP proxy for routing requests.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Set rate limiting configuration.
    pub fn with_rate_limiting(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Set connection pool configuration.
    pub fn with_connection_pool(mut self, config: ConnectionPoolConfig) -> Self {
        self.connection_pool = config;
        self
    }

    /// Load configuration from environment variables (and a `.env` file, if present).
    ///
    /// This will look for:
    /// - `DOCBATCH_BASE_URL` for the service base URL
    /// - `DOCBATCH_AUTH_TOKEN` for the bearer token
    /// - `DOCBATCH_TIMEOUT` for request timeout (in seconds, must be a valid u64)
    /// - `DOCBATCH_MAX_RETRIES` for maximum retry attempts (must be a valid u32)
    /// - `DOCBATCH_PROXY` for HTTP proxy
    ///
    /// # Errors
    ///
    /// Returns an error if `DOCBATCH_TIMEOUT` or `DOCBATCH_MAX_RETRIES` are set
    /// but cannot be parsed as numbers.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        use std::env;

        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(base_url) = env::var("DOCBATCH_BASE_URL") {
            config.base_url = Some(base_url);
        }

        if let Ok(auth_token) = env::var("DOCBATCH_AUTH_TOKEN") {
            config.auth_token = Some(SecretString::new(auth_token.into_boxed_str()));
        }

        if let Ok(timeout_str) = env::var("DOCBATCH_TIMEOUT") {
            let timeout_secs = timeout_str.parse::<u64>().map_err(|_| {
                crate::error::Error::InvalidRequest(format!(
                    "DOCBATCH_TIMEOUT must be a valid number of seconds, got: '{}'",
                    timeout_str
                ))
            })?;
            config.timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(max_retries_str) = env::var("DOCBATCH_MAX_RETRIES") {
            config.max_retries = max_retries_str.parse::<u32>().map_err(|_| {
                crate::error::Error::InvalidRequest(format!(
                    "DOCBATCH_MAX_RETRIES must be a valid number, got: '{}'",
                    max_retries_str
                ))
            })?;
        }

        if let Ok(proxy) = env::var("DOCBATCH_PROXY") {
            config.proxy = Some(proxy);
        }

        Ok(config)
    }

    /// Merge this configuration with another, with the other taking precedence.
    pub fn merge(mut self, other: ClientConfig) -> Self {
        if other.auth_token.is_some() {
            self.auth_token = other.auth_token;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.timeout != DEFAULT_TIMEOUT {
            self.timeout = other.timeout;
        }
        if other.max_retries != DEFAULT_MAX_RETRIES {
            self.max_retries = other.max_retries;
        }
        for (key, value) in other.default_headers.iter() {
            self.default_headers.insert(key.clone(), value.clone());
        }
        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }
        if other.rate_limit.is_some() {
            self.rate_limit = other.rate_limit;
        }

        self
    }
}

/// Configuration for HTTP connection pooling.
///
/// # Default Values
///
/// - `max_idle_per_host`: 10 connections
/// - `idle_timeout`: 90 seconds
/// - `tcp_keepalive`: 60 seconds
#[derive(Debug, Clone)]
pub struct ConnectionPoolConfig {
    /// Maximum number of idle connections to keep per host.
    pub max_idle_per_host: usize,

    /// How long an idle connection remains in the pool before being closed.
    pub idle_timeout: Duration,

    /// TCP keep-alive interval. `None` disables keep-alive.
    pub tcp_keepalive: Option<Duration>,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 10,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
        }
    }
}

/// Configuration for client-side rate limiting (token bucket).
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per second allowed.
    pub requests_per_second: f64,

    /// Burst size for the token bucket.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10.0,
            burst_size: 20,
        }
    }
}

/// Builder for creating ClientConfig with a fluent API.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bearer token.
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

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Add a default header.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, crate::error::Error> {
        let key_str = key.into();
        let value_str = value.into();
        let key: http::HeaderName = key_str
            .parse()
            .map_err(|_| crate::error::Error::InvalidHeaderName(key_str.clone()))?;
        let value: http::HeaderValue = value_str
            .parse()
            .map_err(|_| crate::error::Error::InvalidHeaderValue(value_str.clone()))?;
        self.config.default_headers.insert(key, value);
        Ok(self)
    }

    /// Set the HTTP proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy.into());
        self
    }

    /// Enable rate limiting with default configuration.
    pub fn with_rate_limiting(mut self) -> Self {
        self.config.rate_limit = Some(RateLimitConfig::default());
        self
    }

    /// Set custom rate limiting configuration.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Set connection pool configuration.
    pub fn connection_pool(mut self, config: ConnectionPoolConfig) -> Self {
        self.config.connection_pool = config;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Timing and behaviour knobs for the batch tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Interval between batch status polls (default 3000 ms)
    pub poll_interval: Duration,

    /// Pause inserted between consecutive downloads of a download-all (default 300 ms)
    pub download_pause: Duration,

    /// Fetch job detail automatically when a poll shows a job newly finished
    pub fetch_details_on_finish: bool,

    /// Buffer size of the event broadcast channel
    pub event_capacity: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            download_pause: DEFAULT_DOWNLOAD_PAUSE,
            fetch_details_on_finish: true,
            event_capacity: 256,
        }
    }
}

impl TrackerConfig {
    /// Set the poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the pause between consecutive downloads.
    pub fn download_pause(mut self, pause: Duration) -> Self {
        self.download_pause = pause;
        self
    }

    /// Enable or disable automatic detail fetching for newly finished jobs.
    pub fn fetch_details_on_finish(mut self, enabled: bool) -> Self {
        self.fetch_details_on_finish = enabled;
        self
    }

    /// Load tracker timings from `DOCBATCH_POLL_INTERVAL_MS` and `DOCBATCH_DOWNLOAD_PAUSE_MS`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not a valid number of milliseconds,
    /// or if the poll interval is zero.
    #[cfg(feature = "env")]
    pub fn from_env() -> Result<Self, crate::error::Error> {
        use std::env;

        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(value) = env::var("DOCBATCH_POLL_INTERVAL_MS") {
            let millis = parse_millis("DOCBATCH_POLL_INTERVAL_MS", &value)?;
            if millis == 0 {
                return Err(crate::error::Error::InvalidRequest(
                    "DOCBATCH_POLL_INTERVAL_MS must be greater than zero".to_string(),
                ));
            }
            config.poll_interval = Duration::from_millis(millis);
        }

        if let Ok(value) = env::var("DOCBATCH_DOWNLOAD_PAUSE_MS") {
            config.download_pause =
                Duration::from_millis(parse_millis("DOCBATCH_DOWNLOAD_PAUSE_MS", &value)?);
        }

        Ok(config)
    }
}

#[cfg(feature = "env")]
fn parse_millis(name: &str, value: &str) -> Result<u64, crate::error::Error> {
    value.parse::<u64>().map_err(|_| {
        crate::error::Error::InvalidRequest(format!(
            "{} must be a valid number of milliseconds, got: '{}'",
            name, value
        ))
    })
}
