//! # Blob Uploader 共有型定義
//!
//! Gateway の HTTP API で送受信する JSON 構造を Rust 構造体として提供する。
//!
//! ## エンコーディング規則
//! - フィールド名は camelCase（ブラウザクライアントとの互換性のため）
//! - Base64: アップロードするバイナリ本体（標準アルファベット、パディングあり）
//! - すべてのレスポンスはフラットな JSON オブジェクトで、`success` を必ず含む

use serde::{Deserialize, Serialize};

/// コンテンツタイプ未指定時に使用する汎用バイナリタイプ。
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// リクエスト
// ---------------------------------------------------------------------------

/// POST /api/files/upload/base64 のリクエストボディ。
///
/// 全フィールドが省略可能。`base64_content` の必須チェックはハンドラ側で行う。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Base64UploadRequest {
    /// 保存先Blob名（省略時はタイムスタンプから生成）
    #[serde(default)]
    pub file_name: Option<String>,
    /// MIMEタイプ（省略時は application/octet-stream）
    #[serde(default)]
    pub content_type: Option<String>,
    /// Base64エンコードされたファイル内容
    #[serde(default)]
    pub base64_content: Option<String>,
}

/// GET /api/files/download のクエリパラメータ。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadQuery {
    /// ダウンロード対象のBlob名
    #[serde(default)]
    pub blob_name: Option<String>,
    /// 保存先のローカルパス
    #[serde(default)]
    pub destination_path: Option<String>,
}

/// POST /api/files/upload のクエリパラメータ。
/// multipart の `blobName` フィールドでも同じ値を指定できる。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    /// 保存先Blob名
    #[serde(default)]
    pub blob_name: Option<String>,
}

// ---------------------------------------------------------------------------
// レスポンス
// ---------------------------------------------------------------------------

/// アップロード成功時のレスポンス（multipart / base64 共通）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// 保存されたBlobのURL
    pub blob_url: String,
    /// 実際に使用されたBlob名（サニタイズ後）
    pub blob_name: String,
    pub content_type: String,
    /// 保存したバイト数
    pub size: u64,
}

/// GET /api/files/list のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    /// Blob名の一覧（順序はバックエンド依存）
    pub blobs: Vec<String>,
    pub count: usize,
}

/// DELETE /api/files/{blobName} のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// GET /api/files/download のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub message: String,
    /// 書き込み先のローカルパス
    pub destination_path: String,
}

/// GET /api/files/content/{blobName} のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub success: bool,
    pub blob_name: String,
    /// Blobの内容（UTF-8としてデコード）
    pub content: String,
}

/// 全エンドポイント共通の失敗レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

impl ErrorResponse {
    /// `success: false` の失敗レスポンスを構築する。
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
