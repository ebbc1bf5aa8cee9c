//! The resolved request handed to an [`HttpClient`](crate::HttpClient).

use http::Method;

/// A fully resolved HTTP request.
///
/// Produced by [`ActionInvoker::build_request`](crate::ActionInvoker::build_request):
/// placeholders are already substituted into `path` and query keys already
/// looked up, so a client only has to put it on the wire.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method (GET, POST, etc.).
    pub method: Method,

    /// The resolved request path (relative to the base URL).
    pub path: String,

    /// Query parameters, in the order they should appear in the URL.
    pub query_params: Vec<(String, String)>,

    /// The outgoing body, sent verbatim.
    pub body: Option<String>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Appends a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Appends multiple query parameters to the request.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }
}
