//! # Gateway エラー型
//!
//! すべての失敗は `{"success": false, "message": ...}` として返す。

use axum::http::StatusCode;
use axum::Json;
use uploader_core::UploadError;
use uploader_types::ErrorResponse;

/// Gatewayエラー型。`Display` の文字列がそのまま `message` になる。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 不正なリクエスト（必須項目の欠落、空ファイル、不正なBase64）
    #[error("{0}")]
    BadRequest(String),
    /// リクエストボディが上限を超過
    #[error("Request body exceeds the upload limit: {0}")]
    PayloadTooLarge(String),
    /// 対象が存在しない、または取得・削除に失敗
    #[error("{0}")]
    NotFound(String),
    /// パスは一致したがメソッドが非対応
    #[error("{0}")]
    MethodNotAllowed(String),
    /// ストレージへのアップロードに失敗
    #[error("Failed to upload file: {0}")]
    Storage(String),
    /// 想定外のエラー
    #[error("An unexpected error occurred: {0}")]
    Internal(String),
}

impl GatewayError {
    /// 対応するHTTPステータスコード。
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Storage(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<UploadError> for GatewayError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidArgument(msg) => GatewayError::BadRequest(msg),
            UploadError::Io(msg) => GatewayError::Storage(msg),
        }
    }
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_mapping() {
        let err = GatewayError::from(UploadError::InvalidArgument("Blob name cannot be empty".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Blob name cannot be empty");

        let err = GatewayError::from(UploadError::Io("connection reset".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to upload file: connection reset");
    }

    #[test]
    fn test_not_found_status() {
        let err = GatewayError::NotFound("Failed to delete blob or blob does not exist".into());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err = GatewayError::MethodNotAllowed("Request method 'POST' is not supported".into());
        assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
