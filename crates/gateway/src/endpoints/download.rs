//! # GET /download/{filename}
//!
//! 保存済みファイルの署名付きダウンロードURL発行。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use file_service_types::DownloadResponse;

use crate::error::GatewayError;
use crate::gateway::{DownloadDescriptor, DownloadRequest, FileGateway};

impl From<DownloadDescriptor> for DownloadResponse {
    fn from(descriptor: DownloadDescriptor) -> Self {
        Self {
            filename: descriptor.filename,
            url: descriptor.url,
            size: descriptor.size_mb,
            content_type: descriptor.content_type,
            message: "Download URL generated successfully".to_string(),
        }
    }
}

/// GET /download/{filename}: 署名付きURL発行。
///
/// URLは毎回新しく生成され、設定された有効期限で失効する。
pub async fn handle_download(
    State(gateway): State<Arc<FileGateway>>,
    Path(filename): Path<String>,
) -> Result<Json<DownloadResponse>, GatewayError> {
    let descriptor = gateway
        .handle_download(DownloadRequest { filename })
        .await?;
    Ok(Json(descriptor.into()))
}

/// GET /download/: ファイル名なし。常に400。
pub async fn handle_download_without_name(
    State(gateway): State<Arc<FileGateway>>,
) -> Result<Json<DownloadResponse>, GatewayError> {
    handle_download(State(gateway), Path(String::new())).await
}
