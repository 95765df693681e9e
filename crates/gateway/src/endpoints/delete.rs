//! # DELETE /api/files/{blobName}

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use uploader_types::DeleteResponse;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// DELETE /api/files/{blobName} — Blob削除。
///
/// 存在しない場合とバックエンド障害の場合はどちらも 404。
pub async fn handle_delete(
    State(state): State<Arc<GatewayState>>,
    Path(blob_name): Path<String>,
) -> Result<Json<DeleteResponse>, GatewayError> {
    tracing::info!(blob_name = %blob_name, "削除リクエストを受信");

    if !state.service.delete_blob(&blob_name).await {
        tracing::warn!(blob_name = %blob_name, "Blobの削除に失敗");
        return Err(GatewayError::NotFound(
            "Failed to delete blob or blob does not exist".to_string(),
        ));
    }

    Ok(Json(DeleteResponse {
        success: true,
        message: "Blob deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::endpoints::test_helpers::{memory_state, seed};

    #[tokio::test]
    async fn test_delete_existing_then_missing() {
        let state = memory_state();
        seed(&state, "old.txt", b"x").await;

        let response = handle_delete(State(state.clone()), Path("old.txt".to_string()))
            .await
            .unwrap()
            .0;
        assert!(response.success);

        let err = handle_delete(State(state), Path("old.txt".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
