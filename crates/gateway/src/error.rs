//! # Gateway エラー型
//!
//! 全エンドポイントで共通のエラー型と、起動時の設定エラー型。

use axum::http::StatusCode;
use axum::Json;
use file_service_types::ErrorResponse;

/// Gatewayエラー型。
///
/// リクエスト単位で終端するエラー。リトライやローカルでの回復は行わず、
/// 各バリアントが1対1でHTTPステータスに対応する。
/// メッセージはそのままレスポンスの `error` フィールドになる。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト（ファイル欠落、サイズ超過、ファイル名不正）
    #[error("{0}")]
    BadRequest(String),
    /// オブジェクトが存在しない、またはメタデータを取得できない
    #[error("{0}")]
    NotFound(String),
    /// 内部エラー（アップロード失敗、署名付きURL生成失敗）
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// エラーに対応するHTTPステータス。
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// 設定読み込みエラー。起動時のみ発生し、プロセスは起動しない。
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定または空
    #[error("環境変数 {0} が設定されていません")]
    MissingSetting(&'static str),
    /// 環境変数の値を解釈できない
    #[error("{name} の値が不正です: {value:?} ({reason})")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },
}
