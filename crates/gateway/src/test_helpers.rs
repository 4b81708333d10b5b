//! # テスト用共通ヘルパー
//!
//! gateway, endpointsテストで共有するインメモリストレージとモックサーバー。

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use bytes::Bytes;

use crate::config::GatewayConfig;
use crate::storage::{ObjectMetadata, ObjectStorage, StorageError};

/// テスト用の設定（デフォルト値）。
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        region: "us-east-1".to_string(),
        bucket_name: "file-service-test".to_string(),
        upload_prefix: "uploads/".to_string(),
        server_port: 8080,
        s3_endpoint: None,
        presign_expiry_secs: 900,
        max_upload_bytes: 100 * 1024 * 1024,
        storage_timeout_secs: 30,
    }
}

/// インメモリに保存されたオブジェクト。
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// テスト用のインメモリObjectStorage。
/// 署名付きURLは `{base_url}/{key}?expires={secs}` 形式で、
/// `start_object_server` で起動したモックサーバーから取得できる。
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
    base_url: Mutex<String>,
    fail_presign: bool,
    puts: AtomicUsize,
    presigns: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            base_url: Mutex::new("http://mock-storage".to_string()),
            fail_presign: false,
            puts: AtomicUsize::new(0),
            presigns: AtomicUsize::new(0),
        }
    }

    /// presign_getが常に失敗するようにする。
    pub fn with_presign_failure(mut self) -> Self {
        self.fail_presign = true;
        self
    }

    pub fn set_base_url(&self, base_url: &str) {
        *self.base_url.lock().unwrap() = base_url.to_string();
    }

    /// ゲートウェイを経由せずにオブジェクトを配置する。
    pub fn insert(&self, key: &str, content_type: &str, body: Vec<u8>) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body: Bytes::from(body),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn presign_count(&self) -> usize {
        self.presigns.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
        let objects = self.objects.lock().unwrap();
        let object = objects
            .get(key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        Ok(ObjectMetadata {
            size_bytes: object.body.len() as u64,
            content_type: (!object.content_type.is_empty()).then(|| object.content_type.clone()),
        })
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        if self.fail_presign {
            return Err(StorageError::Backend("署名鍵が利用できません".to_string()));
        }
        self.presigns.fetch_add(1, Ordering::SeqCst);
        let base_url = self.base_url.lock().unwrap().clone();
        Ok(format!("{base_url}/{key}?expires={expiry_secs}"))
    }
}

/// 全操作が失敗するObjectStorage（認証失敗等を想定）。
pub struct FailingStorage;

#[async_trait::async_trait]
impl ObjectStorage for FailingStorage {
    async fn put_object(&self, _key: &str, _body: Bytes, _ct: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("AccessDenied".to_string()))
    }

    async fn head_object(&self, _key: &str) -> Result<ObjectMetadata, StorageError> {
        Err(StorageError::Backend("AccessDenied".to_string()))
    }

    async fn presign_get(&self, _key: &str, _expiry_secs: u32) -> Result<String, StorageError> {
        Err(StorageError::Backend("AccessDenied".to_string()))
    }
}

/// 応答を返さないObjectStorage（タイムアウト検証用）。
pub struct StallingStorage;

#[async_trait::async_trait]
impl ObjectStorage for StallingStorage {
    async fn put_object(&self, _key: &str, _body: Bytes, _ct: &str) -> Result<(), StorageError> {
        std::future::pending().await
    }

    async fn head_object(&self, _key: &str) -> Result<ObjectMetadata, StorageError> {
        std::future::pending().await
    }

    async fn presign_get(&self, _key: &str, _expiry_secs: u32) -> Result<String, StorageError> {
        std::future::pending().await
    }
}

async fn serve_object(
    State(storage): State<Arc<MemoryStorage>>,
    Path(key): Path<String>,
) -> axum::response::Response {
    match storage.object(&key) {
        Some(object) => (
            [(header::CONTENT_TYPE, object.content_type)],
            object.body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// MemoryStorageの内容を `GET /{key}` で配信するモックサーバーを起動し、ポートを返す。
pub async fn start_object_server(storage: Arc<MemoryStorage>) -> u16 {
    let app = axum::Router::new()
        .route("/{*key}", axum::routing::get(serve_object))
        .with_state(storage);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// ルーターを起動し、ポートを返す。
pub async fn start_app(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}
