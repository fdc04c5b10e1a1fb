//! In-process [`Backend`] holding collections as JSON rows.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicI64, Ordering},
};

use async_trait::async_trait;
use common::error::{ConsoleError, ConsoleResult};
use dashmap::DashMap;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use types::Id;

use crate::Backend;

#[derive(Default)]
pub struct MemoryBackend {
    collections: DashMap<String, BTreeMap<Id, Value>>,
    next_id: AtomicI64,
    paged: bool,
    // "METHOD path" -> canned answer, used once for failures and forever
    // for fixed responses.
    failures: DashMap<String, (u16, Option<String>)>,
    fixed: DashMap<String, Value>,
    token: Mutex<Option<String>>,
    log: Mutex<Vec<String>>,
}

fn split(path: &str) -> (String, Option<Id>) {
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((collection, last)) => match last.parse::<Id>() {
            Ok(id) => (collection.to_owned(), Some(id)),
            Err(_) => (trimmed.to_owned(), None),
        },
        None => (trimmed.to_owned(), None),
    }
}

fn bad_body() -> ConsoleError {
    ConsoleError::Status {
        status: 400,
        detail: Some("Expected a JSON object.".to_owned()),
    }
}

fn not_found() -> ConsoleError {
    ConsoleError::Status {
        status: 404,
        detail: Some("Not found.".to_owned()),
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Answers list requests with a `{count, results}` envelope.
    pub fn paged() -> Self {
        Self {
            paged: true,
            ..Self::new()
        }
    }

    /// Seeds a row; takes its `id` if present, otherwise assigns one.
    /// Non-object rows are wrapped as `{"value": row}`.
    pub fn insert(&self, endpoint: &str, row: Value) -> Id {
        let mut row = match row {
            Value::Object(_) => row,
            other => json!({ "value": other }),
        };
        let id = match row.get("id").and_then(Value::as_i64) {
            Some(id) => {
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                row["id"] = json!(id);
                id
            }
        };
        let (collection, _) = split(endpoint);
        self.collections.entry(collection).or_default().insert(id, row);
        id
    }

    pub fn rows(&self, endpoint: &str) -> Vec<Value> {
        let (collection, _) = split(endpoint);
        self.collections
            .get(&collection)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Next `method path` request fails with the given status.
    pub fn fail_once(&self, method: &str, path: &str, status: u16, detail: Option<&str>) {
        self.failures.insert(
            format!("{} {}", method, path),
            (status, detail.map(str::to_owned)),
        );
    }

    /// `method path` always answers `value`, bypassing the collections.
    pub fn respond(&self, method: &str, path: &str, value: Value) {
        self.fixed.insert(format!("{} {}", method, path), value);
    }

    pub async fn token(&self) -> Option<String> {
        self.token.lock().await.clone()
    }

    /// Every request seen so far, as `METHOD path`.
    pub async fn requests(&self) -> Vec<String> {
        self.log.lock().await.clone()
    }

    async fn enter(&self, method: &str, path: &str) -> ConsoleResult<Option<Value>> {
        let key = format!("{} {}", method, path);
        self.log.lock().await.push(key.clone());
        if let Some((_, (status, detail))) = self.failures.remove(&key) {
            return Err(ConsoleError::Status { status, detail });
        }
        Ok(self.fixed.get(&key).map(|v| v.value().clone()))
    }

    fn write(&self, path: &str, body: Value, merge: bool) -> ConsoleResult<Value> {
        if !body.is_object() {
            return Err(bad_body());
        }
        let (collection, id) = split(path);
        let id = id.ok_or_else(not_found)?;
        let mut rows = self.collections.get_mut(&collection).ok_or_else(not_found)?;
        let row = rows.get_mut(&id).ok_or_else(not_found)?;

        if merge {
            if let (Some(fields), Value::Object(patch)) = (row.as_object_mut(), &body) {
                for (k, v) in patch {
                    fields.insert(k.clone(), v.clone());
                }
                return Ok(row.clone());
            }
        }

        let mut body = body;
        body["id"] = json!(id);
        *row = body;
        Ok(row.clone())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, path: &str) -> ConsoleResult<Value> {
        if let Some(v) = self.enter("GET", path).await? {
            return Ok(v);
        }
        let (collection, id) = split(path);
        match id {
            Some(id) => self
                .collections
                .get(&collection)
                .and_then(|rows| rows.get(&id).cloned())
                .ok_or_else(not_found),
            None => {
                let rows = self.rows(path);
                if self.paged {
                    Ok(json!({"count": rows.len(), "next": null, "results": rows}))
                } else {
                    Ok(Value::Array(rows))
                }
            }
        }
    }

    async fn post(&self, path: &str, body: Value) -> ConsoleResult<Value> {
        if let Some(v) = self.enter("POST", path).await? {
            return Ok(v);
        }
        if !body.is_object() {
            return Err(bad_body());
        }
        let mut body = body;
        if let Some(fields) = body.as_object_mut() {
            fields.remove("id");
        }
        let id = self.insert(path, body);
        let (collection, _) = split(path);
        self.collections
            .get(&collection)
            .and_then(|rows| rows.get(&id).cloned())
            .ok_or_else(not_found)
    }

    async fn put(&self, path: &str, body: Value) -> ConsoleResult<Value> {
        if let Some(v) = self.enter("PUT", path).await? {
            return Ok(v);
        }
        self.write(path, body, false)
    }

    async fn patch(&self, path: &str, body: Value) -> ConsoleResult<Value> {
        if let Some(v) = self.enter("PATCH", path).await? {
            return Ok(v);
        }
        self.write(path, body, true)
    }

    async fn delete(&self, path: &str) -> ConsoleResult<()> {
        if self.enter("DELETE", path).await?.is_some() {
            return Ok(());
        }
        let (collection, id) = split(path);
        let id = id.ok_or_else(not_found)?;
        self.collections
            .get_mut(&collection)
            .and_then(|mut rows| rows.remove(&id))
            .map(|_| ())
            .ok_or_else(not_found)
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token.lock().await = token;
    }
}
