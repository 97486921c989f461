//! HTTP request builder

use super::Response;
use crate::error::{Error, Result};
use crate::observability::{RequestMetadata, RequestTimer, ResponseMetadata};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::time::Duration;
use url::Url;

/// Builder for HTTP requests.
///
/// Retryable failures (429, 5xx, timeouts) are retried up to `max_retries`
/// times with exponential backoff (1s, 2s, 4s, ...), honouring `Retry-After`.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timeout: Duration,
    pub(crate) max_retries: u32,
    pub(crate) http_client: Option<reqwest::Client>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: crate::config::DEFAULT_TIMEOUT,
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            http_client: None,
        }
    }

    /// Set the HTTP client to use
    pub(crate) fn with_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Try to set a header, returning an error if the name or value is invalid.
    ///
    /// # Errors
    /// Returns an error if the header name or value contains invalid characters.
    pub fn try_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key_str = key.into();
        let value_str = value.into();

        let key = key_str
            .parse::<HeaderName>()
            .map_err(|e| Error::InvalidHeaderName(format!("'{}': {}", key_str, e)))?;
        let value = value_str
            .parse::<HeaderValue>()
            .map_err(|e| Error::InvalidHeaderValue(format!("'{}': {}", value_str, e)))?;

        self.headers.insert(key, value);
        Ok(self)
    }

    /// Set an already-validated header.
    pub fn typed_header(mut self, key: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.url.query_pairs_mut().append_pair(key, value);
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `value` as the JSON request body.
    pub fn json<T: serde::Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        Ok(self.body(serde_json::to_vec(value)?))
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Send the request and get a response.
    ///
    /// HTTP error statuses are returned as a `Response`; use
    /// [`Response::parse_result`] to turn them into errors.
    pub async fn send(self) -> Result<Response> {
        let client = self
            .http_client
            .ok_or_else(|| Error::HttpClient("No HTTP client configured".to_string()))?;

        let mut metadata = RequestMetadata::new(self.method.as_str(), self.url.path());
        if let Some(body) = &self.body {
            metadata = metadata.with_body_size(body.len());
        }
        metadata.log_request();

        let mut req = client
            .request(self.method.clone(), self.url.as_str())
            .timeout(self.timeout);

        for (key, value) in &self.headers {
            req = req.header(key, value);
        }

        if let Some(body) = self.body {
            req = req.body(body);
        }

        let timer = RequestTimer::start();
        let mut attempt = 0;
        loop {
            let attempt_req = req
                .try_clone()
                .ok_or_else(|| Error::HttpClient("Could not clone request".to_string()))?;

            match attempt_req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    let body = resp
                        .bytes()
                        .await
                        .map_err(|e| Error::Connection(e.to_string()))?
                        .to_vec();

                    let response = Response::new(status, headers, body);

                    if response.is_error() && attempt < self.max_retries {
                        let error = Error::from_response(
                            status.as_u16(),
                            &String::from_utf8_lossy(response.body()),
                            response.headers(),
                        );

                        if error.is_retryable() {
                            attempt += 1;
                            let delay = error
                                .retry_after()
                                .unwrap_or_else(|| backoff_delay(attempt));
                            tracing::debug!(
                                path = %metadata.path,
                                status = status.as_u16(),
                                attempt,
                                delay_ms = delay.as_millis(),
                                "Retrying request"
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }

                    let response_metadata = ResponseMetadata::new(status.as_u16(), timer.elapsed())
                        .with_body_size(response.body().len())
                        .with_retries(attempt);
                    if response.is_error() {
                        response_metadata.log_error(&metadata, status.as_str());
                    } else {
                        response_metadata.log_success(&metadata);
                    }

                    return Ok(response.with_retries(attempt));
                }
                Err(e) if e.is_timeout() => {
                    if attempt >= self.max_retries {
                        return Err(Error::Timeout(self.timeout));
                    }
                    attempt += 1;
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
                Err(e) => {
                    tracing::debug!(path = %metadata.path, error = %e, "Request failed to send");
                    return Err(Error::Connection(e.to_string()));
                }
            }
        }
    }

    /// Get the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get the timeout.
    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}

// Exponential backoff: 1s, 2s, 4s, ...
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt.saturating_sub(1)).min(60))
}
