//! # オブジェクトストレージ
//!
//! Gatewayが委譲するリモートオブジェクトストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。
//! テストではインメモリ実装に差し替える。

#[cfg(feature = "vendor-aws")]
pub mod s3;

#[cfg(feature = "vendor-aws")]
pub use s3::S3ObjectStorage;

use bytes::Bytes;

/// ストレージ層のエラー。呼び出し元には直接返さず、
/// `FileGateway` が `GatewayError` に変換する。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// 指定キーのオブジェクトが存在しない
    #[error("オブジェクトが存在しません: {0}")]
    NotFound(String),
    /// バックエンドがエラーを返した（認証失敗、通信失敗等）
    #[error("ストレージ操作に失敗: {0}")]
    Backend(String),
    /// 呼び出しがタイムアウトした
    #[error("ストレージ呼び出しが {0} 秒でタイムアウトしました")]
    Timeout(u64),
}

/// HEADで取得するオブジェクトのメタデータ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// オブジェクトサイズ（バイト）
    pub size_bytes: u64,
    /// 保存時のMIMEタイプ。ストレージが返さない場合はNone。
    pub content_type: Option<String>,
}

/// オブジェクトストレージの抽象インターフェース。
///
/// AWS S3, MinIO, Cloudflare R2 等のS3互換ストレージや、
/// テスト用のインメモリ実装を差し替えられる。
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// `key` にコンテンツを書き込む。既存オブジェクトは上書きされる。
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// コンテンツを取得せずにメタデータのみを取得する。
    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StorageError>;

    /// `key` のオブジェクトを匿名で取得できる署名付きURL（GET）を生成する。
    async fn presign_get(&self, key: &str, expiry_secs: u32) -> Result<String, StorageError>;
}
