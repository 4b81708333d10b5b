//! # Gatewayエンドポイント
//!
//! ルーティングとHTTPレスポンスへの変換。

pub mod download;
pub mod health;
pub mod upload;

pub use download::{handle_download, handle_download_without_name};
pub use health::handle_health;
pub use upload::handle_upload;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;

use crate::gateway::FileGateway;

/// 全ルートを束ねたルーターを構築する。
///
/// アップロード本文は `handle_upload` が上限を超えた分を読み捨てながら数えるため、
/// axumのデフォルトの本文サイズ上限は無効化する。
pub fn router(gateway: Arc<FileGateway>) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(handle_health))
        .route("/upload", axum::routing::post(handle_upload))
        .route("/download/", axum::routing::get(handle_download_without_name))
        .route("/download/{filename}", axum::routing::get(handle_download))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}
