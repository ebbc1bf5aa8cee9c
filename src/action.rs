//! Action descriptors.
//!
//! An [`Action`] describes one HTTP operation: its verb, a path template,
//! the query keys it forwards, how to build a request body from invocation
//! arguments, and how to transform responses per status code. It holds data
//! only; [`ActionInvoker`](crate::ActionInvoker) does the work.

use http::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::{Error, RawResponse, Result};

type UnaryFn = dyn Fn(&Value) -> String + Send + Sync;
type BinaryFn = dyn Fn(&Value, &Value) -> String + Send + Sync;
type VariadicFn = dyn Fn(&[Value]) -> String + Send + Sync;

/// Builds an outgoing request body from invocation arguments.
///
/// Each shape declares how many leading arguments it consumes. The
/// arguments are passed in call order; any beyond the arity are ignored.
///
/// # Examples
///
/// ```
/// use resource_kit::BodyTransform;
/// use serde_json::json;
///
/// let concat = BodyTransform::binary(|a, b| {
///     format!("{}{}", a.as_str().unwrap_or_default(), b.as_str().unwrap_or_default())
/// });
///
/// let body = concat.apply(&[json!("echo me"), json!(" another")]).unwrap();
/// assert_eq!(body, "echo me another");
/// ```
#[derive(Clone)]
pub enum BodyTransform {
    /// Receives the first argument.
    Unary(Arc<UnaryFn>),

    /// Receives the first two arguments.
    Binary(Arc<BinaryFn>),

    /// Receives the first `arity` arguments as a slice.
    Variadic {
        /// The number of arguments required.
        arity: usize,
        /// The transform itself.
        transform: Arc<VariadicFn>,
    },
}

impl BodyTransform {
    /// Creates a transform of one argument.
    pub fn unary<F>(f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        BodyTransform::Unary(Arc::new(f))
    }

    /// Creates a transform of two arguments.
    pub fn binary<F>(f: F) -> Self
    where
        F: Fn(&Value, &Value) -> String + Send + Sync + 'static,
    {
        BodyTransform::Binary(Arc::new(f))
    }

    /// Creates a transform receiving the first `arity` arguments.
    pub fn variadic<F>(arity: usize, f: F) -> Self
    where
        F: Fn(&[Value]) -> String + Send + Sync + 'static,
    {
        BodyTransform::Variadic {
            arity,
            transform: Arc::new(f),
        }
    }

    /// Renders the first argument as compact JSON text.
    ///
    /// ```
    /// use resource_kit::BodyTransform;
    /// use serde_json::json;
    ///
    /// let body = BodyTransform::json().apply(&[json!({"name": "Alice"})]).unwrap();
    /// assert_eq!(body, r#"{"name":"Alice"}"#);
    /// ```
    pub fn json() -> Self {
        Self::unary(|value| value.to_string())
    }

    /// The number of leading arguments this transform consumes.
    pub fn arity(&self) -> usize {
        match self {
            BodyTransform::Unary(_) => 1,
            BodyTransform::Binary(_) => 2,
            BodyTransform::Variadic { arity, .. } => *arity,
        }
    }

    /// Applies the transform to the leading arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BodyTransformArity`] if fewer than [`arity`](Self::arity)
    /// arguments are supplied.
    pub fn apply(&self, args: &[Value]) -> Result<String> {
        let expected = self.arity();
        if args.len() < expected {
            return Err(Error::BodyTransformArity {
                expected,
                provided: args.len(),
            });
        }

        let body = match self {
            BodyTransform::Unary(f) => f(&args[0]),
            BodyTransform::Binary(f) => f(&args[0], &args[1]),
            BodyTransform::Variadic { arity, transform } => transform(&args[..*arity]),
        };
        Ok(body)
    }
}

impl fmt::Debug for BodyTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyTransform")
            .field("arity", &self.arity())
            .finish()
    }
}

type HandlerFn<T> = dyn Fn(RawResponse) -> Result<T> + Send + Sync;

/// A response transform registered against a status code.
pub struct Handler<T> {
    inner: Arc<HandlerFn<T>>,
}

impl<T> Handler<T> {
    fn new<F>(f: F) -> Self
    where
        F: Fn(RawResponse) -> Result<T> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Runs the transform against a response.
    pub fn handle(&self, response: RawResponse) -> Result<T> {
        (self.inner)(response)
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// A declarative description of one HTTP operation.
///
/// `T` is the value an invocation returns. Responses without a registered
/// handler are returned as their raw body, converted with `T: From<String>`,
/// so the default `String` works out of the box.
///
/// # Examples
///
/// ```
/// use resource_kit::{Action, BodyTransform};
/// use http::Method;
///
/// let action: Action = Action::new("create")
///     .verb(Method::POST)
///     .path("/users")
///     .body(BodyTransform::json())
///     .handler(201, |_response| "created".to_string())
///     .handler(422, |response| format!("rejected: {}", response.body));
///
/// assert_eq!(action.method(), &Method::POST);
/// assert!(action.handler_for(201).is_some());
/// assert!(action.handler_for(200).is_none());
/// ```
pub struct Action<T = String> {
    name: String,
    verb: Method,
    path: String,
    query_keys: Vec<String>,
    body: Option<BodyTransform>,
    handlers: HashMap<u16, Handler<T>>,
}

impl<T> Action<T> {
    /// Creates a GET action with an empty path.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verb: Method::GET,
            path: String::new(),
            query_keys: Vec::new(),
            body: None,
            handlers: HashMap::new(),
        }
    }

    /// Sets the HTTP verb.
    pub fn verb(mut self, verb: Method) -> Self {
        self.verb = verb;
        self
    }

    /// Sets the path template, e.g. `/users/:id`.
    pub fn path(mut self, template: impl Into<String>) -> Self {
        self.path = template.into();
        self
    }

    /// Sets the keys read from the parameter bag into the query string.
    pub fn query_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.query_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the body transform.
    pub fn body(mut self, transform: BodyTransform) -> Self {
        self.body = Some(transform);
        self
    }

    /// The action's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The HTTP verb.
    pub fn method(&self) -> &Method {
        &self.verb
    }

    /// The unresolved path template.
    pub fn path_template(&self) -> &str {
        &self.path
    }

    /// The configured query keys, in order.
    pub fn query_key_names(&self) -> &[String] {
        &self.query_keys
    }

    /// The body transform, if any.
    pub fn body_transform(&self) -> Option<&BodyTransform> {
        self.body.as_ref()
    }

    /// The handler registered for `status`, if any.
    pub fn handler_for(&self, status: u16) -> Option<&Handler<T>> {
        self.handlers.get(&status)
    }

    /// Whether requests for this action carry a body.
    pub fn sends_body(&self) -> bool {
        self.body.is_some()
            && matches!(self.verb, Method::POST | Method::PUT | Method::PATCH)
    }
}

impl<T: 'static> Action<T> {
    /// Registers a transform for responses with the given status code.
    ///
    /// A later registration for the same status replaces the earlier one.
    pub fn handler<F>(self, status: u16, f: F) -> Self
    where
        F: Fn(RawResponse) -> T + Send + Sync + 'static,
    {
        self.try_handler(status, move |response| Ok(f(response)))
    }

    /// Registers a fallible transform for the given status code.
    pub fn try_handler<F>(mut self, status: u16, f: F) -> Self
    where
        F: Fn(RawResponse) -> Result<T> + Send + Sync + 'static,
    {
        self.handlers.insert(status, Handler::new(f));
        self
    }

    /// Registers one transform for several status codes.
    pub fn handlers<I, F>(mut self, statuses: I, f: F) -> Self
    where
        I: IntoIterator<Item = u16>,
        F: Fn(RawResponse) -> T + Send + Sync + 'static,
    {
        let handler = Handler::new(move |response| Ok(f(response)));
        for status in statuses {
            self.handlers.insert(status, handler.clone());
        }
        self
    }
}

impl<T: DeserializeOwned + 'static> Action<T> {
    /// Registers a handler that parses the body as JSON into `T`.
    pub fn json_handler(self, status: u16) -> Self {
        self.try_handler(status, |response| response.json())
    }
}

impl<T> fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut statuses: Vec<_> = self.handlers.keys().copied().collect();
        statuses.sort_unstable();

        f.debug_struct("Action")
            .field("name", &self.name)
            .field("verb", &self.verb)
            .field("path", &self.path)
            .field("query_keys", &self.query_keys)
            .field("body", &self.body)
            .field("handlers", &statuses)
            .finish()
    }
}
