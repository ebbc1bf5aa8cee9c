//! The raw response an [`HttpClient`](crate::HttpClient) hands back.
//!
//! [`RawResponse`] is what status handlers receive. When no handler matches,
//! the invoker returns its body unchanged.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::{Error, Result};

/// An HTTP response before any action-specific transform is applied.
///
/// # Examples
///
/// ```
/// use resource_kit::RawResponse;
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// let response = RawResponse::new(
///     StatusCode::NOT_FOUND,
///     HeaderMap::new(),
///     "not found".to_string(),
///     Duration::from_millis(12),
/// );
///
/// assert_eq!(response.status_code(), 404);
/// assert_eq!(response.body, "not found");
/// ```
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The raw response body as a string.
    pub body: String,

    /// Time from sending the request until the body was fully read.
    pub latency: Duration,
}

impl RawResponse {
    /// Creates a new `RawResponse`.
    pub fn new(status: StatusCode, headers: HeaderMap, body: String, latency: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            latency,
        }
    }

    /// Returns the status code as a plain integer, the key handlers are registered under.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns a reference to a header value by name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use resource_kit::RawResponse;
    /// # use http::{HeaderMap, HeaderValue, StatusCode};
    /// # use std::time::Duration;
    /// let mut headers = HeaderMap::new();
    /// headers.insert("content-type", HeaderValue::from_static("text/plain"));
    ///
    /// let response = RawResponse::new(StatusCode::OK, headers, String::new(), Duration::ZERO);
    /// assert_eq!(response.header("content-type"), Some("text/plain"));
    /// ```
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] carrying the raw body when
    /// the body does not parse into `D`.
    pub fn json<D: DeserializeOwned>(&self) -> Result<D> {
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::error!(
                error = %e,
                raw_response = %self.body,
                "Failed to deserialize response"
            );
            Error::DeserializationFailed {
                raw_response: self.body.clone(),
                serde_error: e.to_string(),
                status: self.status,
            }
        })
    }
}
