//! HTTP transport used by the invoker.
//!
//! [`HttpClient`] is the seam between action resolution and the wire. The
//! crate ships [`Connection`], a reqwest-backed implementation configured
//! through [`ConnectionBuilder`]; tests and alternative transports can
//! implement the trait directly.

use crate::{metadata::RequestMetadata, Error, RawResponse, Result};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Executes a resolved request and returns the raw response.
///
/// Implementations own connection management, timeouts and transport
/// errors. Whatever they return is handed to the caller unchanged.
///
/// # Examples
///
/// ```
/// use resource_kit::{HttpClient, RawResponse, RequestMetadata, Result};
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// struct Echo;
///
/// impl HttpClient for Echo {
///     async fn execute(&self, request: RequestMetadata) -> Result<RawResponse> {
///         Ok(RawResponse::new(
///             StatusCode::OK,
///             HeaderMap::new(),
///             request.body.unwrap_or_default(),
///             Duration::ZERO,
///         ))
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends one request.
    fn execute(
        &self,
        request: RequestMetadata,
    ) -> impl Future<Output = Result<RawResponse>> + Send;
}

impl<C: HttpClient> HttpClient for &C {
    fn execute(
        &self,
        request: RequestMetadata,
    ) -> impl Future<Output = Result<RawResponse>> + Send {
        (**self).execute(request)
    }
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn execute(
        &self,
        request: RequestMetadata,
    ) -> impl Future<Output = Result<RawResponse>> + Send {
        (**self).execute(request)
    }
}

/// A pre-configured HTTP connection backed by `reqwest`.
///
/// The connection is designed to be reused across many invocations. Cloning
/// is cheap and shares the underlying connection pool.
///
/// # Examples
///
/// ```no_run
/// use resource_kit::{Action, ActionInvoker, Connection};
/// use serde_json::json;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), resource_kit::Error> {
/// let connection = Connection::builder()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("Accept", "application/json")?
///     .build()?;
///
/// let find: Action = Action::new("find").path("/users/:id");
/// let user = ActionInvoker::call(&find, &connection, &[json!({"id": 12})]).await?;
/// println!("{}", user);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl Connection {
    /// Creates a new `ConnectionBuilder`.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// The base URL every request path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Builds the absolute URL for a resolved request.
    ///
    /// A path prefix on the base URL is kept, so a base of
    /// `https://host/api/v1` and a path of `/users` yield `/api/v1/users`.
    pub fn url_for(&self, request: &RequestMetadata) -> Url {
        let mut url = self.inner.base_url.clone();

        let prefix = url.path().trim_end_matches('/');
        let path = if request.path.starts_with('/') || request.path.is_empty() {
            format!("{}{}", prefix, request.path)
        } else {
            format!("{}/{}", prefix, request.path)
        };
        url.set_path(&path);

        if !request.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query_params {
                pairs.append_pair(key, value);
            }
        }

        url
    }
}

impl HttpClient for Connection {
    async fn execute(&self, request: RequestMetadata) -> Result<RawResponse> {
        let url = self.url_for(&request);
        let start_time = Instant::now();

        tracing::debug!(
            method = %request.method,
            url = %url,
            has_body = request.body.is_some(),
            "Executing HTTP request"
        );

        let mut builder = self.inner.http_client.request(request.method.clone(), url);

        for (name, value) in &self.inner.default_headers {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(map_transport_error)?;
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        Ok(RawResponse::new(status, headers, body, latency))
    }
}

fn map_transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(err)
    }
}

/// Builder for configuring and creating a [`Connection`].
///
/// # Examples
///
/// ```no_run
/// use resource_kit::ConnectionBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), resource_kit::Error> {
/// let connection = ConnectionBuilder::new()
///     .base_url("https://api.example.com")?
///     .timeout(Duration::from_secs(10))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ConnectionBuilder {
    /// Creates a new `ConnectionBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Sets the base URL for all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Connection`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided or if the underlying
    /// HTTP client cannot be created.
    pub fn build(self) -> Result<Connection> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;

        let http_client = reqwest::Client::builder().build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                http_client,
                base_url,
                default_headers: self.default_headers,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, ActionInvoker};
    use http::Method;
    use serde_json::json;

    fn connection(base: &str) -> Connection {
        Connection::builder().base_url(base).unwrap().build().unwrap()
    }

    #[test]
    fn test_build_requires_base_url() {
        let result = ConnectionBuilder::new().build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let result = ConnectionBuilder::new().default_header("bad header", "x");
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_url_for_keeps_base_prefix() {
        let conn = connection("https://api.example.com/v2/");
        let request = RequestMetadata::new(Method::GET, "/users/12");

        assert_eq!(
            conn.url_for(&request).as_str(),
            "https://api.example.com/v2/users/12"
        );
    }

    #[test]
    fn test_url_for_keeps_encoded_placeholder_segments() {
        let conn = connection("https://h.example");
        let action: Action = Action::new("find").path("/users/:id/posts");

        let request = ActionInvoker::build_request(&action, &[json!({"id": "a/../b"})]).unwrap();

        assert_eq!(
            conn.url_for(&request).as_str(),
            "https://h.example/users/a%2F..%2Fb/posts"
        );
    }

    #[test]
    fn test_url_for_encodes_query_in_order() {
        let conn = connection("https://api.example.com");
        let request = RequestMetadata::new(Method::GET, "/search")
            .with_query_param("q", "a b&c")
            .with_query_param("page", "2");

        assert_eq!(
            conn.url_for(&request).as_str(),
            "https://api.example.com/search?q=a+b%26c&page=2"
        );
    }
}
