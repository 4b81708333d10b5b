//! # Gateway設定
//!
//! 環境変数からの設定読み込み。
//!
//! 設定値は起動時に一度だけ構築され、以降は不変。グローバル変数として参照せず、
//! `FileGateway` とストレージアダプタのコンストラクタに明示的に渡す。

use crate::error::ConfigError;

/// アップロードキーのプレフィックス（外部から変更不可）
pub const DEFAULT_UPLOAD_PREFIX: &str = "uploads/";

/// 署名付きURLの有効期限のデフォルト（秒）
pub const DEFAULT_PRESIGN_EXPIRY_SECS: u32 = 900;

/// アップロード最大サイズのデフォルト（MiB）
pub const DEFAULT_MAX_UPLOAD_MB: u64 = 100;

/// ストレージ呼び出しのタイムアウトのデフォルト（秒）
pub const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;

/// Gateway設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// S3リージョン（`AWS_REGION`）
    pub region: String,
    /// バケット名（`AWS_S3_BUCKET`）
    pub bucket_name: String,
    /// オブジェクトキーのプレフィックス
    pub upload_prefix: String,
    /// 待ち受けポート（`SERVER_PORT`）
    pub server_port: u16,
    /// S3互換エンドポイント（`S3_ENDPOINT`）。MinIO, Cloudflare R2 等で使用。
    /// Noneの場合はAWS S3のリージョンエンドポイント。
    pub s3_endpoint: Option<String>,
    /// 署名付きURLの有効期限（秒）
    pub presign_expiry_secs: u32,
    /// アップロード最大サイズ（バイト）
    pub max_upload_bytes: u64,
    /// ストレージ呼び出し1回あたりのタイムアウト（秒）
    pub storage_timeout_secs: u64,
}

impl GatewayConfig {
    /// プロセスの環境変数から読み込む。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み込む。
    ///
    /// 必須項目はバケット名、リージョン、ポートの順に検査する。
    /// 空文字列は未設定と同じ扱い。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::MissingSetting(name));

        let bucket_name = require("AWS_S3_BUCKET")?;
        let region = require("AWS_REGION")?;
        let server_port_raw = require("SERVER_PORT")?;
        let server_port = parse_setting("SERVER_PORT", &server_port_raw)?;

        let presign_expiry_secs = match get("PRESIGN_EXPIRY_SECS") {
            Some(v) => parse_positive("PRESIGN_EXPIRY_SECS", &v)?,
            None => DEFAULT_PRESIGN_EXPIRY_SECS,
        };
        let max_upload_mb: u64 = match get("MAX_UPLOAD_MB") {
            Some(v) => parse_positive("MAX_UPLOAD_MB", &v)?,
            None => DEFAULT_MAX_UPLOAD_MB,
        };
        let storage_timeout_secs = match get("STORAGE_TIMEOUT_SECS") {
            Some(v) => parse_positive("STORAGE_TIMEOUT_SECS", &v)?,
            None => DEFAULT_STORAGE_TIMEOUT_SECS,
        };

        Ok(Self {
            region,
            bucket_name,
            upload_prefix: DEFAULT_UPLOAD_PREFIX.to_string(),
            server_port,
            s3_endpoint: get("S3_ENDPOINT"),
            presign_expiry_secs,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            storage_timeout_secs,
        })
    }

    /// 待ち受けアドレス。
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.server_port)
    }

    /// アップロード最大サイズ（MiB）。エラーメッセージ用。
    pub fn max_upload_mb(&self) -> u64 {
        self.max_upload_bytes / (1024 * 1024)
    }

    /// 有効な設定をログに出力する。資格情報は含まない。
    pub fn log_summary(&self) {
        tracing::info!(
            region = %self.region,
            bucket = %self.bucket_name,
            upload_prefix = %self.upload_prefix,
            server_port = self.server_port,
            s3_endpoint = ?self.s3_endpoint,
            presign_expiry_secs = self.presign_expiry_secs,
            max_upload_mb = self.max_upload_mb(),
            storage_timeout_secs = self.storage_timeout_secs,
            "S3 File Service 設定"
        );
    }
}

fn parse_setting<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidSetting {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_positive<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let parsed: T = parse_setting(name, value)?;
    if parsed == T::default() {
        return Err(ConfigError::InvalidSetting {
            name,
            value: value.to_string(),
            reason: "1以上である必要があります".to_string(),
        });
    }
    Ok(parsed)
}
