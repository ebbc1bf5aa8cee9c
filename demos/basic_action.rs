//! Basic demo of declaring actions and invoking them.
//!
//! This demo shows how to:
//! - Configure a connection
//! - Declare GET actions with path placeholders and query keys
//! - Declare a POST action with a JSON body transform
//! - Transform responses per status code
//!
//! Run with: `cargo run --example basic_action`

use http::Method;
use resource_kit::{Action, ActionInvoker, BodyTransform, Connection, Error};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("resource_kit=debug,basic_action=info")
        .init();

    let connection = Connection::builder()
        .base_url("https://jsonplaceholder.typicode.com")?
        .default_header("Accept", "application/json")?
        .build()?;

    println!("=== Path placeholders ===");
    let find: Action<Value> = Action::new("find")
        .path("/posts/:id")
        .json_handler(200)
        .handler(404, |_| Value::Null);

    let post = ActionInvoker::call(&find, &connection, &[json!({"id": 1})]).await?;
    println!("Title: {}", post["title"]);

    let missing = ActionInvoker::call(&find, &connection, &[json!({"id": 100000})]).await?;
    println!("Missing post: {}", missing);
    println!();

    println!("=== Query keys ===");
    let by_user: Action = Action::new("by_user")
        .path("/posts")
        .query_keys(["userId", "_limit"]);

    let body = ActionInvoker::call(&by_user, &connection, &[json!({"userId": 1, "_limit": 2})])
        .await?;
    println!("Raw body: {} bytes", body.len());
    println!();

    println!("=== Body transforms ===");
    let create: Action = Action::new("create")
        .verb(Method::POST)
        .path("/posts")
        .body(BodyTransform::binary(|title, params| {
            json!({"title": title, "userId": params["userId"]}).to_string()
        }))
        .handler(201, |response| format!("created in {:?}", response.latency));

    let outcome = ActionInvoker::call(
        &create,
        &connection,
        &[json!("My New Post"), json!({"userId": 1})],
    )
    .await?;
    println!("{}", outcome);

    Ok(())
}
