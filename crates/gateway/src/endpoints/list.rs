//! # GET /api/files/list
//!
//! コンテナ内のBlob一覧。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use uploader_types::ListResponse;

use crate::config::GatewayState;

/// GET /api/files/list — Blob一覧。
///
/// 常に 200。バックエンド障害時も空の一覧を返す。
pub async fn handle_list(State(state): State<Arc<GatewayState>>) -> Json<ListResponse> {
    tracing::info!("Blob一覧リクエストを受信");
    let blobs = state.service.list_blobs().await;
    let count = blobs.len();
    tracing::info!(count, "Blob一覧を返却");
    Json(ListResponse {
        success: true,
        blobs,
        count,
    })
}
