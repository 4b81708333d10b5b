//! # S3 File Service Gateway
//!
//! オブジェクトストレージへのファイルアップロードと、
//! 保存済みファイルの署名付きダウンロードURL発行を行うHTTPゲートウェイ。
//!
//! ## 役割
//! - リクエスト検証（ファイル欠落、サイズ上限、ファイル名）
//! - ストレージキーの導出（プレフィックス + ファイル名）
//! - S3互換ストレージへの書き込み・メタデータ取得・署名付きURL生成
//! - ストレージの結果/エラーをHTTPレスポンスに変換
//!
//! ## API エンドポイント
//! - `GET /health`: 死活監視
//! - `POST /upload`: multipartの `file` フィールドをアップロード
//! - `GET /download/{filename}`: 署名付きダウンロードURL発行

mod config;
mod endpoints;
mod error;
mod gateway;
mod storage;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use config::GatewayConfig;
use gateway::FileGateway;
use storage::S3ObjectStorage;

/// Ctrl-C または SIGTERM を待つ。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl-Cハンドラの登録に失敗");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERMハンドラの登録に失敗");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // .env はあれば読み込む（存在しなくてもエラーにしない）
    if let Ok(path) = dotenvy::dotenv() {
        tracing::info!(path = %path.display(), ".envを読み込みました");
    }

    // 必須設定が欠けている場合はルートを公開せずに終了する
    let config = GatewayConfig::from_env()?;
    config.log_summary();

    let storage = S3ObjectStorage::from_config(&config)?;
    let gateway = Arc::new(FileGateway::new(&config, Arc::new(storage)));
    let app = endpoints::router(gateway);

    let addr = config.bind_addr();
    tracing::info!("S3 File Service を {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("S3 File Service を停止しました");
    Ok(())
}
