//! # ルート不一致時のレスポンス
//!
//! axum既定の空ボディ 404 / 405 を使わず、すべて `{success: false, message}` で返す。

use std::sync::Arc;

use axum::extract::{OriginalUri, Path, State};
use axum::http::Method;
use axum::Json;
use uploader_types::DeleteResponse;

use super::{handle_delete, API_BASE_PATH};
use crate::config::GatewayState;
use crate::error::GatewayError;

/// `/api/files/` 直下の1セグメントを返す。
fn single_segment(path: &str) -> Option<&str> {
    path.strip_prefix(API_BASE_PATH)?
        .strip_prefix('/')
        .filter(|rest| !rest.is_empty() && !rest.contains('/'))
}

/// パスは一致したがメソッドが非対応の場合。
///
/// `list` `upload` `download` は固定ルートと重なるため、
/// これらへのDELETEはBlob名として削除に回す。
pub async fn handle_method_fallback(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<DeleteResponse>, GatewayError> {
    if method == Method::DELETE {
        if let Some(blob_name) = single_segment(uri.path()) {
            return handle_delete(State(state), Path(blob_name.to_string())).await;
        }
    }

    tracing::warn!(method = %method, path = %uri.path(), "非対応のメソッド");
    Err(GatewayError::MethodNotAllowed(format!(
        "Request method '{method}' is not supported for {}",
        uri.path()
    )))
}

/// どのルートにも一致しない場合。
pub async fn handle_not_found(OriginalUri(uri): OriginalUri) -> GatewayError {
    tracing::warn!(path = %uri.path(), "ルートが存在しません");
    GatewayError::NotFound(format!("No endpoint for {}", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment() {
        assert_eq!(single_segment("/api/files/list"), Some("list"));
        assert_eq!(single_segment("/api/files/upload"), Some("upload"));
        assert_eq!(single_segment("/api/files/upload/base64"), None);
        assert_eq!(single_segment("/api/files/content/a.txt"), None);
        assert_eq!(single_segment("/api/files/"), None);
        assert_eq!(single_segment("/"), None);
    }
}
