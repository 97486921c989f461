//! Error types for the docbatch client
//!
//! A single error enum covers the HTTP layer (status-code mapping, transport
//! failures) and the tracker operations that surface failures to the caller
//! (submission, single download, download-all).

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail with a docbatch error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the docbatch client.
#[derive(Debug, Error)]
pub enum Error {
    /// Service rejected the request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from the service
        message: String,
    },

    /// Authentication failed (401).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Permission denied (403).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Conflict error (409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request body failed server-side validation (422).
    #[error("Unprocessable entity: {message}")]
    UnprocessableEntity {
        /// Error message
        message: String,
        /// Validation errors if provided
        errors: Option<Vec<ValidationError>>,
    },

    /// Rate limit exceeded (429).
    #[error("Rate limit exceeded")]
    RateLimit {
        /// Time to wait before retrying, if provided by the service
        retry_after: Option<Duration>,
    },

    /// Internal server error (500+).
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    /// Generic API error for status codes not covered above.
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
        /// Request ID for debugging
        request_id: Option<String>,
    },

    /// Failed to deserialize a service response.
    #[error("Failed to parse API response: {0}")]
    ResponseValidation(String),

    /// Network or connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTTP client configuration or initialization error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid HTTP header name.
    #[error("Invalid HTTP header name: {0}")]
    InvalidHeaderName(String),

    /// Invalid HTTP header value.
    #[error("Invalid HTTP header value: {0}")]
    InvalidHeaderValue(String),

    /// Submitting a generation request failed. No batch was created.
    #[error("Submission failed: {message}")]
    Submission {
        /// Human-readable reason, taken from the service when available
        message: String,
        /// Underlying transport or API error
        #[source]
        source: Option<Box<Error>>,
    },

    /// Exporting a single job result failed.
    #[error("Download of job {job_id} failed: {source}")]
    Download {
        /// Job whose export failed
        job_id: String,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },

    /// A download-all sequence stopped at its first failure.
    #[error("Download-all aborted after {completed} file(s): {source}")]
    DownloadAllAborted {
        /// Job that triggered the abort, if the failure happened per job
        job_id: Option<String>,
        /// Number of artifacts exported before the failure
        completed: usize,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },
}

/// Validation error details for UnprocessableEntity errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted location of the offending field (e.g. `body.request`)
    pub field: String,
    /// Validation error message
    pub message: String,
    /// Error code if provided
    pub code: Option<String>,
}

impl Error {
    /// Create an API error from an HTTP response status and body.
    ///
    /// The service reports failures as `{"detail": "..."}`, or for request
    /// validation failures as `{"detail": [{"loc": [...], "msg": "...", "type": "..."}]}`.
    pub fn from_response(status: u16, body: &str, headers: &http::HeaderMap) -> Self {
        let parsed = serde_json::from_str::<ServiceErrorBody>(body)
            .ok()
            .and_then(|b| b.detail);

        let (message, errors) = match parsed {
            Some(ErrorDetail::Message(message)) => (message, None),
            Some(ErrorDetail::Validation(items)) => {
                let errors: Vec<ValidationError> = items
                    .into_iter()
                    .map(|item| ValidationError {
                        field: item
                            .loc
                            .iter()
                            .map(|part| match part {
                                serde_json::Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>()
                            .join("."),
                        message: item.msg,
                        code: item.error_type,
                    })
                    .collect();
                let message = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                (message, Some(errors))
            }
            None if !body.trim().is_empty() => (body.to_string(), None),
            None => (status_fallback_message(status), None),
        };

        match status {
            400 => Error::BadRequest { message },
            401 => Error::Authentication(message),
            403 => Error::PermissionDenied(message),
            404 => Error::NotFound(message),
            409 => Error::Conflict(message),
            422 => Error::UnprocessableEntity { message, errors },
            429 => Error::RateLimit {
                retry_after: headers
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs),
            },
            s if s >= 500 => Error::InternalServerError(message),
            _ => Error::ApiError {
                status,
                message,
                request_id: headers
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .map(String::from),
            },
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RateLimit { .. } => true,
            Error::InternalServerError(_) => true,
            Error::Connection(_) => true,
            Error::Timeout(_) => true,
            Error::ApiError { status, .. } => *status >= 500 || *status == 408 || *status == 409,
            _ => false,
        }
    }

    /// Get retry delay if this is a rate limit error with retry-after.
    pub fn retry_after(&self) -> Option<Duration> {
        if let Error::RateLimit { retry_after } = self {
            *retry_after
        } else {
            None
        }
    }

    /// The message the service attached to an HTTP error, if this is one.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            Error::BadRequest { message }
            | Error::UnprocessableEntity { message, .. }
            | Error::ApiError { message, .. } => Some(message),
            Error::Authentication(message)
            | Error::PermissionDenied(message)
            | Error::NotFound(message)
            | Error::Conflict(message)
            | Error::InternalServerError(message) => Some(message),
            _ => None,
        }
    }

    /// Wrap a failed submit call.
    pub(crate) fn submission(source: Error) -> Self {
        let message = source
            .service_message()
            .map(String::from)
            .unwrap_or_else(|| source.to_string());
        Error::Submission {
            message,
            source: Some(Box::new(source)),
        }
    }
}

fn status_fallback_message(status: u16) -> String {
    match http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {}: {}", status, reason),
        None => format!("HTTP {}", status),
    }
}

// Helper structures for parsing service error responses

#[derive(Debug, serde::Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    detail: Option<ErrorDetail>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Validation(Vec<ServiceValidationError>),
}

#[derive(Debug, serde::Deserialize)]
struct ServiceValidationError {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}
