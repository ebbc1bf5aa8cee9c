//! Error types for action invocation.
//!
//! Errors raised while resolving an action (missing path parameters, body
//! transforms starved of arguments) live next to the transport errors raised
//! by [`Connection`](crate::Connection). Nothing here is retried; every error
//! is handed straight back to the caller.

use http::StatusCode;

/// The main error type for invoking actions.
///
/// # Examples
///
/// ```no_run
/// use resource_kit::{Action, ActionInvoker, Connection, Error};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Error> {
/// let connection = Connection::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
/// let action: Action = Action::new("find").path("/users/:id");
///
/// match ActionInvoker::call(&action, &connection, &[json!({})]).await {
///     Ok(body) => println!("Found: {}", body),
///     Err(Error::MissingPathParameter { name, .. }) => {
///         eprintln!("Forgot to pass `{}`", name);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The path template names a placeholder that the parameter bag does not supply.
    #[error("Missing path parameter `{name}` for template `{template}`")]
    MissingPathParameter {
        /// The placeholder name, without the leading colon
        name: String,
        /// The template being resolved
        template: String,
    },

    /// A body transform needs more arguments than the invocation provided.
    #[error("Body transform expects {expected} argument(s) but {provided} were given")]
    BodyTransformArity {
        /// The arity the transform declares
        expected: usize,
        /// The number of arguments available
        provided: usize,
    },

    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    ///
    /// This wraps the underlying `reqwest::Error` untouched.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    ///
    /// This occurs when the request takes longer than the timeout configured
    /// on the [`Connection`](crate::Connection).
    #[error("Request timed out")]
    Timeout,

    /// A transport error raised by a custom [`HttpClient`](crate::HttpClient).
    #[error("Transport error: {0}")]
    Transport(Box<dyn std::error::Error + Send + Sync>),

    /// Failed to deserialize the response body into the expected type.
    ///
    /// Raised by JSON handlers. Preserves the raw body so it can be logged.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Invalid configuration was provided.
    ///
    /// This indicates a problem with how the connection or request was
    /// configured, such as a missing base URL or an invalid header value.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Wraps an error from a custom transport without altering it.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Transport(err.into())
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::Network(e) => e.status(),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for action invocation.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
