//! # エンドポイントテスト用共通ヘルパー

use std::sync::Arc;

use bytes::Bytes;
use uploader_core::{BlobService, BlobStore, MemoryBlobStore, StoreError};

use crate::config::GatewayState;

/// テスト用のボディ上限（1 MiB）
pub const TEST_MAX_UPLOAD_SIZE: usize = 1024 * 1024;

/// 全操作がバックエンド障害を返すストア。
pub struct FailingStore;

#[async_trait::async_trait]
impl BlobStore for FailingStore {
    fn container_name(&self) -> &str {
        "broken"
    }
    async fn ensure_container(&self) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    fn blob_url(&self, blob_name: &str) -> String {
        format!("broken://{blob_name}")
    }
    async fn put(&self, _: &str, _: Bytes, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    async fn exists(&self, _: &str) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    async fn get(&self, _: &str) -> Result<Bytes, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
    async fn delete(&self, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

/// 指定ストアでGatewayStateを構築する。
pub fn state_with(store: Arc<dyn BlobStore>, max_upload_size: usize) -> Arc<GatewayState> {
    Arc::new(GatewayState {
        service: BlobService::new(store),
        max_upload_size,
    })
}

/// 空のインメモリストア（コンテナ名 `uploads`）を持つGatewayState。
pub fn memory_state() -> Arc<GatewayState> {
    state_with(
        Arc::new(MemoryBlobStore::new("uploads")),
        TEST_MAX_UPLOAD_SIZE,
    )
}

/// バックエンドが常に失敗するGatewayState。
pub fn failing_state() -> Arc<GatewayState> {
    state_with(Arc::new(FailingStore), TEST_MAX_UPLOAD_SIZE)
}

/// サービス経由でBlobを1つ登録する。
pub async fn seed(state: &GatewayState, blob_name: &str, data: &[u8]) {
    state
        .service
        .upload_from_stream(data, blob_name, None)
        .await
        .unwrap();
}

/// Gatewayのルーターをローカルポートで起動し、ベースURLを返す。
pub async fn spawn_app(state: Arc<GatewayState>) -> String {
    let app = crate::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}
