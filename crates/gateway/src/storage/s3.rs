//! # S3互換オブジェクトストレージ実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIを使用する実装。

use bytes::Bytes;
use s3::error::S3Error;

use super::{ObjectMetadata, ObjectStorage, StorageError};
use crate::config::GatewayConfig;

/// S3互換ストレージによる `ObjectStorage` 実装。
pub struct S3ObjectStorage {
    bucket: s3::Bucket,
}

impl S3ObjectStorage {
    /// S3バケットから構築する。
    pub fn new(bucket: s3::Bucket) -> Self {
        Self { bucket }
    }

    /// 設定と静的資格情報からS3バケットを初期化する。
    ///
    /// `s3_endpoint` が設定されている場合はカスタムリージョン + パススタイル。
    fn init_bucket(
        config: &GatewayConfig,
        access_key: &str,
        secret_key: &str,
    ) -> anyhow::Result<s3::Bucket> {
        let region = match &config.s3_endpoint {
            Some(endpoint) => s3::Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .region
                .parse()
                .map_err(|e| anyhow::anyhow!("リージョンの解釈に失敗: {}: {e}", config.region))?,
        };

        let credentials = s3::creds::Credentials::new(
            Some(access_key),
            Some(secret_key),
            None,
            None,
            None,
        )?;

        let bucket = s3::Bucket::new(&config.bucket_name, region, credentials)?;
        let bucket = if config.s3_endpoint.is_some() {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(*bucket)
    }

    /// 設定と環境変数 `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` から構築する。
    /// 未設定の資格情報は空文字列の静的資格情報として扱う。
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let access_key = std::env::var("AWS_ACCESS_KEY_ID").unwrap_or_default();
        let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default();
        if access_key.is_empty() || secret_key.is_empty() {
            tracing::warn!("AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY が未設定です");
        }

        let bucket = Self::init_bucket(config, &access_key, &secret_key)?;
        tracing::info!(bucket = %config.bucket_name, "S3クライアントを初期化しました");
        Ok(Self::new(bucket))
    }
}

/// rust-s3のエラーを分類する。HTTP 404のみ `NotFound`。
fn classify(key: &str, err: S3Error) -> StorageError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StorageError::NotFound(key.to_string()),
        other => StorageError::Backend(other.to_string()),
    }
}

/// 非2xxステータスを分類する。
fn check_status(key: &str, status: u16) -> Result<(), StorageError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StorageError::NotFound(key.to_string())),
        other => Err(StorageError::Backend(format!("HTTP {other}"))),
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let response = self
            .bucket
            .put_object_with_content_type(key, &body, content_type)
            .await
            .map_err(|e| classify(key, e))?;
        check_status(key, response.status_code())
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StorageError> {
        let (head, status) = self
            .bucket
            .head_object(key)
            .await
            .map_err(|e| classify(key, e))?;
        check_status(key, status)?;

        Ok(ObjectMetadata {
            size_bytes: head.content_length.unwrap_or(0).max(0) as u64,
            content_type: head.content_type,
        })
    }

    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError> {
        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(|e| StorageError::Backend(format!("署名付きダウンロードURL生成失敗: {e}")))
    }
}
