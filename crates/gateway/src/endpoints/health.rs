//! # GET /health
//!
//! 死活監視。ストレージには接続しない。

use axum::Json;
use file_service_types::HealthResponse;

/// GET /health: 常に200を返す。
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::endpoints::router;
    use crate::gateway::FileGateway;
    use crate::test_helpers::{start_app, test_config, FailingStorage};

    /// ストレージが全て失敗する状態でも200を返すことを確認
    #[tokio::test]
    async fn test_health_ignores_storage() {
        let gateway = FileGateway::new(&test_config(), Arc::new(FailingStorage));
        let port = start_app(router(Arc::new(gateway))).await;

        let response = reqwest::get(format!("http://127.0.0.1:{port}/health"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            serde_json::json!({"status": "ok", "service": "S3 File Service"})
        );
    }
}
