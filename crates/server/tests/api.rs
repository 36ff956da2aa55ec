//! End-to-end tests against a live server on an ephemeral port

use async_trait::async_trait;
use bcached_cache::{
    CacheError, EmptyExpectation, FileStore, PersistedRecord, RecordStore,
};
use bcached_server::{Server, ServerConfig, ServerError};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    base: String,
    client: reqwest::Client,
    stop: oneshot::Sender<()>,
    task: JoinHandle<bcached_server::Result<()>>,
}

impl TestServer {
    async fn start(config: ServerConfig, store: Arc<dyn RecordStore>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::start(&config, store, listener).unwrap();
        let addr = server.local_addr().unwrap();

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(server.serve_with_shutdown(async {
            let _ = stopped.await;
        }));

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            stop,
            task,
        }
    }

    async fn on_dir(dir: &Path) -> Self {
        let config = ServerConfig {
            data_dir: dir.to_path_buf(),
            ..Default::default()
        };
        Self::start(config, Arc::new(FileStore::new(dir))).await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap().unwrap();
    }
}

/// Delays every load so requests outlive a short gateway timeout
struct SlowStore {
    inner: FileStore,
    delay: Duration,
}

#[async_trait]
impl RecordStore for SlowStore {
    async fn load(&self, key: &str) -> bcached_cache::Result<Option<PersistedRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.load(key).await
    }

    async fn store(&self, record: &PersistedRecord) -> bcached_cache::Result<()> {
        self.inner.store(record).await
    }
}

#[tokio::test]
async fn test_get_missing_key() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    let (status, body) = server.post("/client/get", json!({"Key": "nope"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["retryable"], false);

    server.stop().await;
}

#[tokio::test]
async fn test_put_then_get() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    let (status, body) = server
        .post("/client/put", json!({"Key": "a", "Value": "1"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Key": "a", "Value": "1", "FromValue": ""}));

    let (status, body) = server.post("/client/get", json!({"Key": "a"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Value"], "1");

    assert!(temp_dir.path().join("a.json").is_file());
    server.stop().await;
}

#[tokio::test]
async fn test_lowercase_field_names() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    let (status, _) = server
        .post("/client/put", json!({"key": "a", "value": "x"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.post("/client/get", json!({"key": "a"})).await;
    assert_eq!(body["Value"], "x");

    server.stop().await;
}

#[tokio::test]
async fn test_compare_and_swap() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    server
        .post("/client/put", json!({"Key": "a", "Value": "1"}))
        .await;

    let (status, body) = server
        .post(
            "/client/put",
            json!({"Key": "a", "Value": "3", "FromValue": "2"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "precondition_failed");

    let (status, _) = server
        .post(
            "/client/put",
            json!({"Key": "a", "Value": "2", "FromValue": "1"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.post("/client/get", json!({"Key": "a"})).await;
    assert_eq!(body["Value"], "2");

    server.stop().await;
}

#[tokio::test]
async fn test_if_absent() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    let put = json!({"Key": "lock", "Value": "owner-1", "IfAbsent": true});
    let (status, body) = server.post("/client/put", put.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["IfAbsent"], true);

    let (status, body) = server.post("/client/put", put).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "precondition_failed");

    let (status, body) = server
        .post(
            "/client/put",
            json!({"Key": "lock", "Value": "x", "FromValue": "owner-1", "IfAbsent": true}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    server.stop().await;
}

#[tokio::test]
async fn test_require_absent_expectation() {
    let temp_dir = TempDir::new().unwrap();
    let config = ServerConfig {
        data_dir: temp_dir.path().to_path_buf(),
        empty_expectation: EmptyExpectation::RequireAbsent,
        ..Default::default()
    };
    let server = TestServer::start(config, Arc::new(FileStore::new(temp_dir.path()))).await;

    let (status, _) = server
        .post("/client/put", json!({"Key": "a", "Value": "1"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = server
        .post("/client/put", json!({"Key": "a", "Value": "2"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    server.stop().await;
}

#[tokio::test]
async fn test_malformed_requests() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    let response = server
        .client
        .post(format!("{}/client/put", server.base))
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "bad_request");

    let (status, body) = server
        .post("/client/put", json!({"Key": "../escape", "Value": "1"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_key");

    let (status, body) = server.get("/no/such/route").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "unknown_route");

    // A misspelled client path must not read as a missing key
    let (status, body) = server.post("/clinet/get", json!({"Key": "a"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "unknown_route");

    server.stop().await;
}

#[tokio::test]
async fn test_corrupt_record_is_decode_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("bad.json"), "{garbage").unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    let (status, body) = server.post("/client/get", json!({"Key": "bad"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "decode_error");

    server.stop().await;
}

#[tokio::test]
async fn test_health_and_stats() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::on_dir(temp_dir.path()).await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    server
        .post("/client/put", json!({"Key": "a", "Value": "1"}))
        .await;
    server.post("/client/get", json!({"Key": "a"})).await;
    server.post("/client/get", json!({"Key": "b"})).await;

    let (status, body) = server.get("/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["writes"], 1);
    assert_eq!(body["hits"], 1);
    assert_eq!(body["misses"], 1);
    assert_eq!(body["resident_entries"], 1);
    assert_eq!(body["shards"], 1);

    server.stop().await;
}

#[tokio::test]
async fn test_values_survive_restart() {
    let temp_dir = TempDir::new().unwrap();

    let first = TestServer::on_dir(temp_dir.path()).await;
    first
        .post("/client/put", json!({"Key": "a", "Value": "persisted"}))
        .await;
    first.stop().await;

    let second = TestServer::on_dir(temp_dir.path()).await;
    let (status, body) = second.post("/client/get", json!({"Key": "a"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Value"], "persisted");

    let (status, _) = second
        .post(
            "/client/put",
            json!({"Key": "a", "Value": "next", "FromValue": "persisted"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    second.stop().await;
}

#[tokio::test]
async fn test_slow_storage_times_out() {
    let temp_dir = TempDir::new().unwrap();
    let config = ServerConfig {
        data_dir: temp_dir.path().to_path_buf(),
        request_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let store = Arc::new(SlowStore {
        inner: FileStore::new(temp_dir.path()),
        delay: Duration::from_millis(500),
    });
    let server = TestServer::start(config, store).await;

    let (status, body) = server.post("/client/get", json!({"Key": "a"})).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], "timeout");
    assert_eq!(body["retryable"], true);

    server.stop().await;
}

#[tokio::test]
async fn test_bind_rejects_file_as_data_dir() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        data_dir: file,
        ..Default::default()
    };

    match Server::bind(config).await {
        Err(ServerError::Cache(CacheError::NotADirectory { .. })) => {}
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("bind should fail"),
    }
}
