//! # POST /api/files/upload/base64
//!
//! Base64エンコードされたJSONペイロードによるアップロード。

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine};
use uploader_core::naming::{generated_blob_name, has_text, sanitize_blob_name};
use uploader_types::{Base64UploadRequest, UploadResponse, DEFAULT_CONTENT_TYPE};

use crate::config::GatewayState;
use crate::error::GatewayError;

/// Base64エンジン（Standard）。デコード時の `=` パディングは有無を問わない。
pub(crate) fn b64() -> GeneralPurpose {
    GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
    )
}

/// JSONボディの抽出エラーを変換する。ボディ上限超過は 413。
fn json_rejection(err: JsonRejection) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(err.body_text())
    } else {
        GatewayError::BadRequest(err.body_text())
    }
}

/// POST /api/files/upload/base64 — Base64アップロード。
///
/// `base64Content` は必須。`fileName` 省略時は `uploaded-<UNIXミリ秒>`、
/// `contentType` 省略時は application/octet-stream。
/// デコードに失敗した場合は何も保存せず 400 を返す。
pub async fn handle_upload_base64(
    State(state): State<Arc<GatewayState>>,
    body: Result<Json<Base64UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, GatewayError> {
    let Json(request) = body.map_err(json_rejection)?;
    let file_name = request.file_name.unwrap_or_default();
    tracing::info!(file_name = %file_name, "base64アップロードリクエストを受信");

    let encoded = request
        .base64_content
        .filter(|c| has_text(c))
        .ok_or_else(|| {
            tracing::warn!(file_name = %file_name, "base64Contentが空です");
            GatewayError::BadRequest("Base64 content cannot be empty.".to_string())
        })?;

    let decoded = b64().decode(encoded.as_bytes()).map_err(|e| {
        tracing::warn!(file_name = %file_name, error = %e, "base64のデコードに失敗");
        GatewayError::BadRequest(format!("Invalid base64 content: {e}"))
    })?;

    let blob_name = if has_text(&file_name) {
        sanitize_blob_name(&file_name)
    } else {
        generated_blob_name()
    };
    let content_type = request
        .content_type
        .filter(|c| has_text(c))
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    tracing::info!(
        blob_name = %blob_name,
        content_type = %content_type,
        size = decoded.len(),
        "base64アップロードを処理"
    );

    let size = decoded.len() as u64;
    let blob_url = state
        .service
        .upload_from_stream(decoded.as_slice(), &blob_name, Some(&content_type))
        .await
        .map_err(|e| {
            tracing::error!(file_name = %file_name, error = %e, "base64アップロードに失敗");
            GatewayError::from(e)
        })?;

    tracing::info!(blob_name = %blob_name, blob_url = %blob_url, "base64アップロードが完了");
    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully.".to_string(),
        blob_url,
        blob_name,
        content_type,
        size,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::test_helpers::{failing_state, memory_state};

    fn request(file_name: Option<&str>, content: Option<&str>) -> Base64UploadRequest {
        Base64UploadRequest {
            file_name: file_name.map(str::to_string),
            content_type: None,
            base64_content: content.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_base64_upload_sanitizes_and_defaults() {
        let state = memory_state();
        let encoded = b64().encode("hello world");

        let response = handle_upload_base64(
            State(state.clone()),
            Ok(Json(request(Some("my doc.txt"), Some(&encoded)))),
        )
        .await
        .unwrap()
        .0;

        assert!(response.success);
        assert_eq!(response.blob_name, "my-doc.txt");
        assert_eq!(response.content_type, DEFAULT_CONTENT_TYPE);
        assert_eq!(response.size, 11);
        assert_eq!(response.blob_url, "memory://uploads/my-doc.txt");
        assert_eq!(
            state.service.blob_content("my-doc.txt").await.as_deref(),
            Some("hello world")
        );
    }

    #[tokio::test]
    async fn test_base64_upload_rejects_empty_and_invalid_content() {
        let state = memory_state();

        for content in [None, Some(""), Some("   ")] {
            let err = handle_upload_base64(State(state.clone()), Ok(Json(request(Some("a"), content))))
                .await
                .unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
            assert_eq!(err.to_string(), "Base64 content cannot be empty.");
        }

        let err = handle_upload_base64(
            State(state.clone()),
            Ok(Json(request(Some("bad.txt"), Some("!!not base64!!")))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Invalid base64 content:"));

        assert!(state.service.list_blobs().await.is_empty());
    }

    #[tokio::test]
    async fn test_base64_upload_accepts_unpadded_content() {
        let state = memory_state();

        let response = handle_upload_base64(
            State(state.clone()),
            Ok(Json(request(Some("a.txt"), Some("aGVsbG8")))),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(response.size, 5);

        let response = handle_upload_base64(
            State(state.clone()),
            Ok(Json(request(Some("b.txt"), Some("aGVsbG8=")))),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(response.size, 5);

        assert_eq!(state.service.blob_content("a.txt").await.as_deref(), Some("hello"));
        assert_eq!(state.service.blob_content("b.txt").await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_base64_upload_generates_distinct_names() {
        let state = memory_state();
        let encoded = b64().encode("x");

        let first = handle_upload_base64(State(state.clone()), Ok(Json(request(None, Some(&encoded)))))
            .await
            .unwrap()
            .0;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = handle_upload_base64(State(state.clone()), Ok(Json(request(Some(""), Some(&encoded)))))
            .await
            .unwrap()
            .0;

        assert!(first.blob_name.starts_with("uploaded-"));
        assert!(second.blob_name.starts_with("uploaded-"));
        assert_ne!(first.blob_name, second.blob_name);
        assert_eq!(state.service.list_blobs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_base64_upload_backend_failure_is_500() {
        let state = failing_state();
        let encoded = b64().encode("x");

        let err = handle_upload_base64(State(state), Ok(Json(request(Some("a.txt"), Some(&encoded)))))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().starts_with("Failed to upload file:"));
    }
}
