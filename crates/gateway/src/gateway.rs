//! # File Gateway
//!
//! アップロード/ダウンロード要求を検証し、オブジェクトストレージ操作に変換する。
//!
//! リクエスト間で可変状態を持たない。ストレージ呼び出しはそれぞれ
//! `storage_timeout_secs` で打ち切られ、リトライは行わない。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::storage::{ObjectStorage, StorageError};

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// アップロード要求。
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// 呼び出し元が指定したファイル名
    pub filename: String,
    /// 呼び出し元が申告したMIMEタイプ
    pub content_type: String,
    /// 受信したサイズ（バイト）。上限超過時は `content` より大きい。
    pub size_bytes: u64,
    /// ファイル内容
    pub content: Bytes,
}

/// ダウンロード要求。
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub filename: String,
}

/// アップロード結果。
#[derive(Debug, Clone, PartialEq)]
pub struct UploadReceipt {
    pub filename: String,
    pub size_mb: f64,
    pub content_type: String,
    pub storage_key: String,
}

/// ダウンロードリンク。リクエストごとに生成し、キャッシュしない。
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadDescriptor {
    pub filename: String,
    pub url: String,
    pub size_mb: f64,
    pub content_type: String,
}

/// バイト数をMiBに変換する。
pub fn bytes_to_mb(size_bytes: u64) -> f64 {
    size_bytes as f64 / BYTES_PER_MIB
}

/// プレフィックスとファイル名からストレージキーを導出する。
///
/// 区切り文字はちょうど1つ。空セグメントと `.` は取り除く。
/// `..` の検査は行わないため、呼び出し前に `validate_filename` を通すこと。
pub fn derive_key(prefix: &str, filename: &str) -> String {
    prefix
        .split('/')
        .chain(filename.split('/'))
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// ファイル名を検証する。空文字列と `..` セグメントを拒否する。
pub fn validate_filename(filename: &str) -> Result<(), GatewayError> {
    if filename.trim().is_empty() {
        return Err(GatewayError::BadRequest("Filename is required".to_string()));
    }
    if filename.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(GatewayError::BadRequest("Invalid filename".to_string()));
    }
    Ok(())
}

/// アップロード/ダウンロードのオーケストレーション。
pub struct FileGateway {
    storage: Arc<dyn ObjectStorage>,
    upload_prefix: String,
    max_upload_bytes: u64,
    presign_expiry_secs: u32,
    storage_timeout: Duration,
}

impl FileGateway {
    /// 設定とストレージ実装から構築する。
    pub fn new(config: &GatewayConfig, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            storage,
            upload_prefix: config.upload_prefix.clone(),
            max_upload_bytes: config.max_upload_bytes,
            presign_expiry_secs: config.presign_expiry_secs,
            storage_timeout: Duration::from_secs(config.storage_timeout_secs),
        }
    }

    /// アップロード最大サイズ（バイト）。
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// ストレージ呼び出しにタイムアウトを適用する。
    async fn with_deadline<T, F>(&self, call: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        tokio::time::timeout(self.storage_timeout, call)
            .await
            .unwrap_or(Err(StorageError::Timeout(self.storage_timeout.as_secs())))
    }

    /// ファイルをアップロードする。
    ///
    /// 同名ファイルは警告なしに上書きされる。サイズ超過時はストレージを呼ばない。
    pub async fn handle_upload(&self, request: UploadRequest) -> Result<UploadReceipt, GatewayError> {
        let size_mb = bytes_to_mb(request.size_bytes);
        if request.size_bytes > self.max_upload_bytes {
            return Err(GatewayError::BadRequest(format!(
                "File too large. Maximum size: {}MB, Received: {:.1}MB",
                self.max_upload_bytes / (1024 * 1024),
                size_mb
            )));
        }
        validate_filename(&request.filename)?;

        let key = derive_key(&self.upload_prefix, &request.filename);
        tracing::info!(
            filename = %request.filename,
            key = %key,
            size_mb,
            content_type = %request.content_type,
            "アップロード要求を受信"
        );

        self.with_deadline(
            self.storage
                .put_object(&key, request.content, &request.content_type),
        )
        .await
        .map_err(|e| {
            tracing::error!(key = %key, error = %e, "S3へのアップロードに失敗");
            GatewayError::Internal("Failed to upload to S3".to_string())
        })?;

        tracing::info!(key = %key, "アップロード完了");

        Ok(UploadReceipt {
            filename: request.filename,
            size_mb,
            content_type: request.content_type,
            storage_key: key,
        })
    }

    /// 署名付きダウンロードURLを発行する。
    ///
    /// メタデータ取得の失敗は種類を問わず `NotFound` になる。種類はログにのみ残す。
    pub async fn handle_download(
        &self,
        request: DownloadRequest,
    ) -> Result<DownloadDescriptor, GatewayError> {
        validate_filename(&request.filename)?;

        let key = derive_key(&self.upload_prefix, &request.filename);
        tracing::info!(filename = %request.filename, key = %key, "ダウンロード要求を受信");

        let metadata = self
            .with_deadline(self.storage.head_object(&key))
            .await
            .map_err(|e| {
                match &e {
                    StorageError::NotFound(_) => {
                        tracing::info!(key = %key, "オブジェクトが存在しません")
                    }
                    _ => tracing::warn!(key = %key, error = %e, "メタデータ取得に失敗"),
                }
                GatewayError::NotFound("File not found".to_string())
            })?;

        let size_mb = bytes_to_mb(metadata.size_bytes);
        let content_type = metadata.content_type.unwrap_or_default();

        let url = self
            .with_deadline(self.storage.presign_get(&key, self.presign_expiry_secs))
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %e, "署名付きURLの生成に失敗");
                GatewayError::Internal("Failed to generate download URL".to_string())
            })?;

        tracing::info!(
            key = %key,
            size_mb,
            expiry_secs = self.presign_expiry_secs,
            "署名付きURLを発行"
        );

        Ok(DownloadDescriptor {
            filename: request.filename,
            url,
            size_mb,
            content_type,
        })
    }
}
