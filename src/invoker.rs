//! Turns an [`Action`] plus runtime arguments into one HTTP request.
//!
//! Invocation is a single pass: partition the arguments, resolve the path,
//! resolve the query, build the body, send, then dispatch the response to a
//! status handler or fall back to the raw body. The invoker keeps no state
//! between calls.

use serde_json::{Map, Value};

use crate::{
    action::Action, client::HttpClient, endpoint::EndpointResolver, metadata::RequestMetadata,
    RawResponse, Result,
};

/// Executes actions against an [`HttpClient`].
///
/// # Examples
///
/// ```no_run
/// use resource_kit::{Action, ActionInvoker, BodyTransform, Connection};
/// use http::Method;
/// use serde_json::json;
///
/// # async fn example() -> Result<(), resource_kit::Error> {
/// let connection = Connection::builder()
///     .base_url("https://api.example.com")?
///     .build()?;
///
/// let list: Action = Action::new("all")
///     .path("/users")
///     .query_keys(["per_page", "page"]);
/// let page = ActionInvoker::call(&list, &connection, &[json!({"page": 2})]).await?;
///
/// let create: Action = Action::new("create")
///     .verb(Method::POST)
///     .path("/users")
///     .body(BodyTransform::json())
///     .handler(201, |_| "created".to_string());
/// let outcome = ActionInvoker::call(&create, &connection, &[json!({"name": "Alice"})]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionInvoker;

impl ActionInvoker {
    /// Invokes `action` through `client`.
    ///
    /// A trailing JSON object in `args` is the parameter bag for path and
    /// query substitution. Every argument, the bag included, is available to
    /// the body transform in call order.
    ///
    /// # Errors
    ///
    /// Resolution errors ([`MissingPathParameter`](crate::Error::MissingPathParameter),
    /// [`BodyTransformArity`](crate::Error::BodyTransformArity)) are raised
    /// before anything is sent. Transport errors come back from the client
    /// untouched. An unhandled status is not an error.
    pub async fn call<T, C>(action: &Action<T>, client: &C, args: &[Value]) -> Result<T>
    where
        T: From<String>,
        C: HttpClient,
    {
        let request = Self::build_request(action, args)?;

        tracing::debug!(
            action = action.name(),
            method = %request.method,
            path = %request.path,
            query_params = request.query_params.len(),
            "Invoking action"
        );

        let response = client.execute(request).await?;
        Self::dispatch(action, response)
    }

    /// Resolves an action and its arguments into a request without sending it.
    ///
    /// ```
    /// use resource_kit::{Action, ActionInvoker};
    /// use serde_json::json;
    ///
    /// let action: Action = Action::new("find")
    ///     .path("/users/:id")
    ///     .query_keys(["fields"]);
    ///
    /// let request = ActionInvoker::build_request(&action, &[json!({"id": 12})]).unwrap();
    /// assert_eq!(request.path, "/users/12");
    /// assert!(request.query_params.is_empty());
    /// ```
    pub fn build_request<T>(action: &Action<T>, args: &[Value]) -> Result<RequestMetadata> {
        let empty = Map::new();
        let params = parameter_bag(args).unwrap_or(&empty);

        let resolver = EndpointResolver::new(action.path_template(), action.query_key_names());
        let path = resolver.resolve_path(params)?;
        let query = resolver.resolve_query(params);

        let mut request =
            RequestMetadata::new(action.method().clone(), path).with_query_params(query);

        if action.sends_body() {
            if let Some(transform) = action.body_transform() {
                request.body = Some(transform.apply(args)?);
            }
        }

        Ok(request)
    }

    /// Applies the handler registered for the response status, or returns the raw body.
    pub fn dispatch<T>(action: &Action<T>, response: RawResponse) -> Result<T>
    where
        T: From<String>,
    {
        let status = response.status_code();

        match action.handler_for(status) {
            Some(handler) => {
                tracing::debug!(action = action.name(), status, "Dispatching to status handler");
                handler.handle(response)
            }
            None => Ok(T::from(response.body)),
        }
    }
}

/// Returns the trailing argument if it is a JSON object.
fn parameter_bag(args: &[Value]) -> Option<&Map<String, Value>> {
    args.last().and_then(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BodyTransform, Error};
    use http::{HeaderMap, Method, StatusCode};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers every request with a fixed status, echoing the body when the
    /// canned body is empty.
    struct StubClient {
        status: StatusCode,
        body: String,
        calls: AtomicUsize,
        last_request: Mutex<Option<RequestMetadata>>,
    }

    impl StubClient {
        fn new(status: StatusCode, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            }
        }

        fn last_request(&self) -> RequestMetadata {
            self.last_request.lock().unwrap().clone().unwrap()
        }
    }

    impl HttpClient for StubClient {
        async fn execute(&self, request: RequestMetadata) -> Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = if self.body.is_empty() {
                request.body.clone().unwrap_or_default()
            } else {
                self.body.clone()
            };
            *self.last_request.lock().unwrap() = Some(request);
            Ok(RawResponse::new(
                self.status,
                HeaderMap::new(),
                body,
                Duration::ZERO,
            ))
        }
    }

    struct FailingClient;

    impl HttpClient for FailingClient {
        async fn execute(&self, _request: RequestMetadata) -> Result<RawResponse> {
            Err(Error::transport("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_returns_raw_body_without_handler() {
        let client = StubClient::new(StatusCode::OK, "all users");
        let action: Action = Action::new("all").path("/users");

        let result = ActionInvoker::call(&action, &client, &[]).await.unwrap();

        assert_eq!(result, "all users");
        assert_eq!(client.last_request().path, "/users");
    }

    #[tokio::test]
    async fn test_handler_result_replaces_body() {
        let client = StubClient::new(StatusCode::OK, "all users");
        let action: Action = Action::new("all")
            .path("/users")
            .handler(200, |_| "changed".to_string());

        let result = ActionInvoker::call(&action, &client, &[]).await.unwrap();
        assert_eq!(result, "changed");
    }

    #[tokio::test]
    async fn test_handler_for_other_status_is_ignored() {
        let client = StubClient::new(StatusCode::OK, "all users");
        let action: Action = Action::new("all")
            .path("/users")
            .handler(404, |_| "404ed".to_string());

        let result = ActionInvoker::call(&action, &client, &[]).await.unwrap();
        assert_eq!(result, "all users");
    }

    #[tokio::test]
    async fn test_missing_path_parameter_sends_nothing() {
        let client = StubClient::new(StatusCode::OK, "user");
        let action: Action = Action::new("find").path("/users/:id");

        let err = ActionInvoker::call(&action, &client, &[json!({"name": "x"})])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingPathParameter { ref name, .. } if name == "id"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_arity_error_sends_nothing() {
        let client = StubClient::new(StatusCode::OK, "");
        let action: Action = Action::new("create")
            .verb(Method::POST)
            .path("/users")
            .body(BodyTransform::binary(|a, b| format!("{}{}", a, b)));

        let err = ActionInvoker::call(&action, &client, &[json!("one")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::BodyTransformArity {
                expected: 2,
                provided: 1
            }
        ));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let action: Action = Action::new("all").path("/users");

        let err = ActionInvoker::call(&action, &FailingClient, &[])
            .await
            .unwrap_err();

        match err {
            Error::Transport(inner) => assert_eq!(inner.to_string(), "connection reset"),
            other => panic!("Expected Transport, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let client = StubClient::new(StatusCode::OK, "user 12");
        let action: Action = Action::new("find")
            .path("/users/:id")
            .query_keys(["expand"]);
        let args = [json!({"id": 12, "expand": "posts"})];

        let first = ActionInvoker::call(&action, &client, &args).await.unwrap();
        let first_request = client.last_request();
        let second = ActionInvoker::call(&action, &client, &args).await.unwrap();
        let second_request = client.last_request();

        assert_eq!(first, second);
        assert_eq!(first_request.path, second_request.path);
        assert_eq!(first_request.query_params, second_request.query_params);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_body_includes_parameter_bag() {
        let action: Action = Action::new("update")
            .verb(Method::PATCH)
            .path("/users/:id")
            .body(BodyTransform::binary(|name, params| {
                format!("{}:{}", name.as_str().unwrap(), params["id"])
            }));

        let request =
            ActionInvoker::build_request(&action, &[json!("alice"), json!({"id": 7})]).unwrap();

        assert_eq!(request.path, "/users/7");
        assert_eq!(request.body.as_deref(), Some("alice:7"));
    }

    #[test]
    fn test_body_is_not_built_for_get() {
        let action: Action = Action::new("find")
            .path("/users")
            .body(BodyTransform::unary(|_| "ignored".to_string()));

        let request = ActionInvoker::build_request(&action, &[]).unwrap();
        assert!(request.body.is_none());
    }

    #[test]
    fn test_non_object_trailing_argument_is_not_a_bag() {
        let action: Action = Action::new("find").path("/users/:id");

        let err = ActionInvoker::build_request(&action, &[json!({"id": 1}), json!("x")])
            .unwrap_err();
        assert!(matches!(err, Error::MissingPathParameter { .. }));
    }

    #[test]
    fn test_dispatch_uses_try_handler_errors() {
        let action: Action = Action::new("find")
            .try_handler(500, |response| Err(Error::ConfigurationError(response.body)));
        let response = RawResponse::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderMap::new(),
            "boom".to_string(),
            Duration::ZERO,
        );

        let err = ActionInvoker::dispatch(&action, response).unwrap_err();
        assert!(matches!(err, Error::ConfigurationError(ref msg) if msg == "boom"));
    }
}
