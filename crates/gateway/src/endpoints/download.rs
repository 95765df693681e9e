//! # GET /api/files/download
//!
//! Blobをサーバー側のローカルパスへ書き出す。

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use uploader_types::{DownloadQuery, DownloadResponse};

use crate::config::GatewayState;
use crate::error::GatewayError;

/// GET /api/files/download?blobName=&destinationPath= — ダウンロード。
///
/// パラメータの欠落、Blobが存在しない、I/O障害はいずれも 404。
pub async fn handle_download(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Json<DownloadResponse>, GatewayError> {
    let blob_name = query.blob_name.unwrap_or_default();
    let destination_path = query.destination_path.unwrap_or_default();
    tracing::info!(
        blob_name = %blob_name,
        destination_path = %destination_path,
        "ダウンロードリクエストを受信"
    );

    if !state
        .service
        .download_blob(&blob_name, &destination_path)
        .await
    {
        tracing::warn!(blob_name = %blob_name, "Blobのダウンロードに失敗");
        return Err(GatewayError::NotFound(
            "Failed to download blob or blob does not exist".to_string(),
        ));
    }

    Ok(Json(DownloadResponse {
        success: true,
        message: "Blob downloaded successfully".to_string(),
        destination_path,
    }))
}
