use async_trait::async_trait;
use common::error::ConsoleResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;
use types::{Id, ListBody};

mod client;
#[cfg(feature = "memory")]
pub mod memory;

pub use client::ApiClient;

/// The REST collaborator every screen talks to. Paths are relative to the
/// api root, e.g. `devices/` or `devices/4/`.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, path: &str) -> ConsoleResult<Value>;
    async fn post(&self, path: &str, body: Value) -> ConsoleResult<Value>;
    async fn put(&self, path: &str, body: Value) -> ConsoleResult<Value>;
    async fn patch(&self, path: &str, body: Value) -> ConsoleResult<Value>;
    async fn delete(&self, path: &str) -> ConsoleResult<()>;

    /// Bearer token sent with every following request.
    async fn set_token(&self, token: Option<String>);
}

/// `batches/` + 3 -> `batches/3/`
pub fn item_path(endpoint: &str, id: Id) -> String {
    format!("{}/{}/", endpoint.trim_end_matches('/'), id)
}

async fn list_body(backend: &dyn Backend, endpoint: &str) -> ConsoleResult<ListBody<Value>> {
    match backend.get(endpoint).await? {
        // 2xx without a body
        Value::Null => Ok(ListBody::Bare(vec![])),
        value => Ok(serde_json::from_value(value)?),
    }
}

/// Fetches a collection, accepting both bare and paginated bodies. Rows
/// that do not fit `T` are logged and skipped.
pub async fn list<T: DeserializeOwned>(
    backend: &dyn Backend,
    endpoint: &str,
) -> ConsoleResult<Vec<T>> {
    let rows = list_body(backend, endpoint)
        .await?
        .into_rows()
        .into_iter()
        .filter_map(|row| {
            let id = row.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(row) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("{} skipping row id:{}: {}", endpoint, id, e);
                    None
                }
            }
        })
        .collect();
    Ok(rows)
}

/// Number of rows in a collection; uses `count` when the backend paginates.
pub async fn count(backend: &dyn Backend, endpoint: &str) -> ConsoleResult<usize> {
    Ok(list_body(backend, endpoint).await?.total())
}
