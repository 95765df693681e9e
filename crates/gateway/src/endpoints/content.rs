//! # GET /api/files/content/{blobName}

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use uploader_types::ContentResponse;

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /api/files/content/{blobName} — Blobの内容をテキストで返す。
pub async fn handle_content(
    State(state): State<Arc<GatewayState>>,
    Path(blob_name): Path<String>,
) -> Result<Json<ContentResponse>, GatewayError> {
    tracing::info!(blob_name = %blob_name, "内容取得リクエストを受信");

    let content = state.service.blob_content(&blob_name).await.ok_or_else(|| {
        tracing::warn!(blob_name = %blob_name, "Blobの内容取得に失敗");
        GatewayError::NotFound("Failed to get blob content or blob does not exist".to_string())
    })?;

    Ok(Json(ContentResponse {
        success: true,
        blob_name,
        content,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::endpoints::test_helpers::{memory_state, seed};

    #[tokio::test]
    async fn test_content_found_and_missing() {
        let state = memory_state();
        seed(&state, "note.txt", "こんにちは".as_bytes()).await;

        let response = handle_content(State(state.clone()), Path("note.txt".to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(response.blob_name, "note.txt");
        assert_eq!(response.content, "こんにちは");

        let err = handle_content(State(state), Path("ghost.txt".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
