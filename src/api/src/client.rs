use std::time::Duration;

use async_trait::async_trait;
use common::{
    config::Config,
    error::{ConsoleError, ConsoleResult},
};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use types::ErrorBody;
use url::Url;

use crate::Backend;

pub struct ApiClient {
    base_url: Url,
    http: Client,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ConsoleResult<Self> {
        // Url::join drops the last segment unless the base ends with '/'.
        let base_url = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConsoleError::Config(format!("api_url {}: {}", base_url, e)))?;
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            http,
            token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &Config) -> ConsoleResult<Self> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ConsoleResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ConsoleError::Common(format!("bad path {}: {}", path, e)))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ConsoleResult<Value> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);

        let mut req = self.http.request(method.clone(), url);
        if let Some(token) = self.token.read().await.as_ref() {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.detail);
            warn!("{} {} -> {}", method, path, status);
            return Err(ConsoleError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn get(&self, path: &str) -> ConsoleResult<Value> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> ConsoleResult<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> ConsoleResult<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> ConsoleResult<Value> {
        self.send(Method::PATCH, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> ConsoleResult<()> {
        self.send(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{get, put},
        Json, Router,
    };
    use serde_json::json;
    use tokio::net::TcpListener;
    use types::{batch::Batch, NamedRef};

    use super::*;
    use crate::list;

    async fn serve() -> String {
        let app = Router::new()
            .route(
                "/api/devices/",
                get(|| async { Json(json!([{"id": 1, "name": "sensor-1"}])) }),
            )
            .route(
                "/api/batches/",
                get(|| async {
                    Json(json!({
                        "count": 1,
                        "results": [{
                            "id": 3,
                            "farm": {"id": 1, "name": "Hill farm"},
                            "name": "Spring broilers",
                            "size": 500,
                            "start_date": "2024-03-01",
                            "end_date": null,
                            "status": "ACTIVE"
                        }]
                    }))
                })
                .post(|Json(mut body): Json<Value>| async move {
                    body["id"] = json!(42);
                    (StatusCode::CREATED, Json(body))
                }),
            )
            .route(
                "/api/batches/:id/",
                put(|Path(id): Path<i64>| async move {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"detail": format!("Batch {} is closed", id)})),
                    )
                })
                .delete(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/api/auth/user/",
                get(|headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("Bearer secret") => (StatusCode::OK, Json(json!({"id": 1}))),
                        _ => (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"detail": "Authentication credentials were not provided."})),
                        ),
                    }
                }),
            )
            .route(
                "/api/broken/",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let c = client("http://localhost:8000/api");
        assert_eq!(c.url("devices/").unwrap().as_str(), "http://localhost:8000/api/devices/");
        assert_eq!(c.url("/devices/4/").unwrap().as_str(), "http://localhost:8000/api/devices/4/");
    }

    #[test]
    fn bad_base_url_is_config_error() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ConsoleError::Config(_))
        ));
    }

    #[tokio::test]
    async fn lists_bare_and_paged_bodies() {
        let c = client(&serve().await);

        let devices: Vec<NamedRef> = list(&c, "devices/").await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "sensor-1");

        let batches: Vec<Batch> = list(&c, "batches/").await.unwrap();
        assert_eq!(batches[0].farm.label(), "Hill farm");
        assert_eq!(batches[0].end_date, None);
    }

    #[tokio::test]
    async fn post_returns_created_row() {
        let c = client(&serve().await);
        let created = c
            .post("batches/", json!({"name": "Layers", "farm": 1}))
            .await
            .unwrap();
        assert_eq!(created["id"], json!(42));
        assert_eq!(created["farm"], json!(1));
    }

    #[tokio::test]
    async fn failure_carries_server_detail() {
        let c = client(&serve().await);
        let err = c.put("batches/7/", json!({})).await.unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.detail(), Some("Batch 7 is closed"));

        let err = c.get("broken/").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.detail(), None);
    }

    #[tokio::test]
    async fn delete_accepts_empty_body() {
        let c = client(&serve().await);
        c.delete("batches/3/").await.unwrap();
    }

    #[tokio::test]
    async fn bearer_token_is_attached() {
        let c = client(&serve().await);
        let err = c.get("auth/user/").await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        c.set_token(Some("secret".to_owned())).await;
        assert_eq!(c.get("auth/user/").await.unwrap()["id"], json!(1));

        c.set_token(None).await;
        assert!(c.get("auth/user/").await.is_err());
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let c = client(&format!("http://{}/api", addr));
        assert!(matches!(
            c.get("devices/").await,
            Err(ConsoleError::Transport(_))
        ));
    }
}
