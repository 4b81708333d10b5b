//! # POST /upload
//!
//! マルチパートフォームの `file` フィールドをオブジェクトストレージに保存する。

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::Json;
use bytes::{Bytes, BytesMut};
use file_service_types::UploadResponse;

use crate::error::GatewayError;
use crate::gateway::{FileGateway, UploadReceipt, UploadRequest};

/// フォーム上のファイルフィールド名
const FILE_FIELD: &str = "file";

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            message: "File uploaded successfully".to_string(),
            filename: receipt.filename,
            size: receipt.size_mb,
            content_type: receipt.content_type,
            s3_key: receipt.storage_key,
        }
    }
}

fn read_error() -> GatewayError {
    GatewayError::BadRequest("Failed to read file".to_string())
}

/// クライアントが送ったパスからファイル名部分のみを取り出す。
fn base_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}

/// MIMEタイプが申告されていない場合は拡張子から推定する。
fn resolve_content_type(declared: Option<&str>, filename: &str) -> String {
    match declared {
        Some(ct) if !ct.is_empty() => ct.to_string(),
        _ => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string(),
    }
}

/// フィールド本文を読み込む。`limit` を超えた分はバッファせずにサイズだけ数える。
async fn read_limited(field: &mut Field<'_>, limit: u64) -> Result<(u64, Bytes), GatewayError> {
    let mut buffer = BytesMut::new();
    let mut total: u64 = 0;

    while let Some(chunk) = field.chunk().await.map_err(|e| {
        tracing::warn!(error = %e, "ファイル本文の読み込みに失敗");
        read_error()
    })? {
        total += chunk.len() as u64;
        if total <= limit {
            buffer.extend_from_slice(&chunk);
        } else if !buffer.is_empty() {
            buffer = BytesMut::new();
        }
    }

    Ok((total, buffer.freeze()))
}

/// POST /upload: ファイルアップロード。
///
/// 本文は `{file: <file>}` 形式のmultipart/form-data。
pub async fn handle_upload(
    State(gateway): State<Arc<FileGateway>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, GatewayError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!(error = %e, "multipart/form-dataではないリクエスト");
        read_error()
    })?;

    while let Some(mut field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!(error = %e, "フォームの解析に失敗");
        read_error()
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !base_name(name).is_empty() => base_name(name).to_string(),
            _ => {
                tracing::warn!("fileフィールドにファイル名がありません");
                return Err(read_error());
            }
        };
        let content_type = resolve_content_type(field.content_type(), &filename);
        let (size_bytes, content) = read_limited(&mut field, gateway.max_upload_bytes()).await?;

        let receipt = gateway
            .handle_upload(UploadRequest {
                filename,
                content_type,
                size_bytes,
                content,
            })
            .await?;
        return Ok(Json(receipt.into()));
    }

    tracing::warn!("fileフィールドがありません。本文は {{file: <file>}} である必要があります");
    Err(read_error())
}
