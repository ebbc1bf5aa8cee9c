//! # Resource Kit - declarative HTTP actions
//!
//! Describe an HTTP operation once as an [`Action`]: its verb, a path
//! template with `:name` placeholders, the query keys it forwards, how to
//! build a body, and how to transform responses per status code. Then invoke
//! it with [`ActionInvoker`] against any [`HttpClient`], such as the
//! reqwest-backed [`Connection`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use resource_kit::{Action, ActionInvoker, BodyTransform, Connection};
//! use http::Method;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), resource_kit::Error> {
//!     let connection = Connection::builder()
//!         .base_url("https://api.example.com")?
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!
//!     // GET /users/12
//!     let find: Action = Action::new("find")
//!         .path("/users/:id")
//!         .handler(404, |_| "no such user".to_string());
//!     let user = ActionInvoker::call(&find, &connection, &[json!({"id": 12})]).await?;
//!     println!("{}", user);
//!
//!     // POST /users with a JSON body built from the first argument
//!     let create: Action = Action::new("create")
//!         .verb(Method::POST)
//!         .path("/users")
//!         .body(BodyTransform::json());
//!     let created = ActionInvoker::call(&create, &connection, &[json!({"name": "Alice"})]).await?;
//!     println!("{}", created);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Arguments
//!
//! Invocation arguments are `serde_json::Value`s. When the last one is an
//! object it becomes the parameter bag: placeholders and query keys are read
//! from it. Query keys missing from the bag are left out of the URL; a
//! missing placeholder fails with [`Error::MissingPathParameter`].
//!
//! ## Typed results
//!
//! `Action<T>` returns `T`. Unhandled statuses return the raw body through
//! `T: From<String>`; handlers produce any `T` they like:
//!
//! ```
//! use resource_kit::Action;
//! use serde_json::Value;
//!
//! let find: Action<Value> = Action::new("find")
//!     .path("/users/:id")
//!     .json_handler(200)
//!     .handler(404, |_| Value::Null);
//! ```

mod action;
mod client;
mod endpoint;
mod error;
mod invoker;
mod metadata;
mod response;

pub use action::{Action, BodyTransform, Handler};
pub use client::{Connection, ConnectionBuilder, HttpClient};
pub use error::{Error, Result};
pub use invoker::ActionInvoker;
pub use metadata::RequestMetadata;
pub use response::RawResponse;
