//! # POST /api/files/upload
//!
//! multipart/form-data によるファイルアップロード。

use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uploader_core::naming::{has_text, sanitize_blob_name};
use uploader_types::{UploadQuery, UploadResponse, DEFAULT_CONTENT_TYPE};

use crate::config::GatewayState;
use crate::error::GatewayError;

/// `file` パートとして受け取ったファイル。
struct UploadedFile {
    file_name: Option<String>,
    content_type: Option<String>,
    data: axum::body::Bytes,
}

/// multipart の読み取りエラーを変換する。ボディ上限超過は 413。
fn multipart_error(err: MultipartError) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(err.body_text())
    } else {
        GatewayError::BadRequest(format!("Malformed multipart request: {}", err.body_text()))
    }
}

/// POST /api/files/upload — multipartアップロード。
///
/// - `file`: 必須。空のファイルは 400
/// - `blobName`: 任意（フォームフィールドまたはクエリ）。省略時は元のファイル名
///
/// 決定したBlob名の空白はハイフンに置換する。
pub async fn handle_upload(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, GatewayError> {
    let mut multipart = multipart.map_err(|e| GatewayError::BadRequest(e.body_text()))?;

    let mut file = None;
    let mut form_blob_name = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            Some("blobName") => {
                form_blob_name = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| {
        GatewayError::BadRequest("Required part 'file' is not present.".to_string())
    })?;
    let original_name = file.file_name.clone().unwrap_or_default();
    tracing::info!(
        file_name = %original_name,
        size = file.data.len(),
        "アップロードリクエストを受信"
    );

    if file.data.is_empty() {
        tracing::warn!(file_name = %original_name, "空のファイルがアップロードされました");
        return Err(GatewayError::BadRequest("File cannot be empty.".to_string()));
    }

    let requested_name = form_blob_name
        .or(query.blob_name)
        .filter(|n| has_text(n));
    let blob_name = match requested_name {
        Some(name) => sanitize_blob_name(name.trim()),
        None => sanitize_blob_name(&original_name),
    };
    let content_type = file
        .content_type
        .filter(|c| has_text(c))
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    tracing::info!(blob_name = %blob_name, "Blob名を決定");

    let size = file.data.len() as u64;
    let blob_url = state
        .service
        .upload_from_stream(file.data.as_ref(), &blob_name, Some(&content_type))
        .await
        .map_err(|e| {
            tracing::error!(file_name = %original_name, error = %e, "アップロードに失敗");
            GatewayError::from(e)
        })?;

    tracing::info!(blob_name = %blob_name, blob_url = %blob_url, "アップロードが完了");
    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully.".to_string(),
        blob_url,
        blob_name,
        content_type,
        size,
    }))
}
