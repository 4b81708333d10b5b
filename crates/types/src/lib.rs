//! # S3 File Service 共有型定義
//!
//! GatewayのHTTPリクエスト/レスポンスで使用するJSONボディの構造体。
//!
//! ## エンコーディング規則
//! - フィールド名はcamelCase（`contentType`, `s3Key`）
//! - サイズはMiB単位の浮動小数点数

use serde::{Deserialize, Serialize};

/// サービス名。`/health` のレスポンスに含まれる。
pub const SERVICE_NAME: &str = "S3 File Service";

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// /health レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 常に "ok"
    pub status: String,
    /// サービス名
    pub service: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// POST /upload
// ---------------------------------------------------------------------------

/// /upload レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// 結果メッセージ
    pub message: String,
    /// アップロードされたファイル名
    pub filename: String,
    /// ファイルサイズ（MiB）
    pub size: f64,
    /// 呼び出し元が申告したMIMEタイプ
    pub content_type: String,
    /// 保存先のオブジェクトキー
    pub s3_key: String,
}

// ---------------------------------------------------------------------------
// GET /download/{filename}
// ---------------------------------------------------------------------------

/// /download レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// 要求されたファイル名
    pub filename: String,
    /// 署名付きダウンロードURL（GET）
    pub url: String,
    /// ファイルサイズ（MiB）
    pub size: f64,
    /// ストレージに記録されたMIMEタイプ（未設定時は空文字列）
    pub content_type: String,
    /// 結果メッセージ
    pub message: String,
}

// ---------------------------------------------------------------------------
// エラー
// ---------------------------------------------------------------------------

/// 全エンドポイント共通のエラーレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 人間が読めるエラーメッセージ
    pub error: String,
}
