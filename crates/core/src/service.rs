//! # Blobサービス
//!
//! 6つの操作をそれぞれバックエンドの1回の呼び出しに委譲する。
//!
//! | 操作 | 成功 | 失敗 |
//! |---|---|---|
//! | `upload_from_path` | URL | `UploadError` |
//! | `upload_from_stream` | URL | `UploadError` |
//! | `list_blobs` | 名前一覧 | 空の一覧 |
//! | `delete_blob` | true | false |
//! | `download_blob` | true | false |
//! | `blob_content` | `Some(text)` | `None` |
//!
//! 一覧・削除・ダウンロード・読み取りでは「存在しない」と「バックエンド障害」を
//! 区別せずに返す。ログでは前者を warn、後者を error として出し分ける。

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};
use uploader_types::DEFAULT_CONTENT_TYPE;

use crate::error::{StoreError, UploadError};
use crate::naming::has_text;
use crate::store::BlobStore;

/// Blob操作サービス。起動時に構築したストアを共有する。
pub struct BlobService {
    store: Arc<dyn BlobStore>,
}

impl BlobService {
    /// 初期化済み（コンテナ作成済み）のストアからサービスを構築する。
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// 対象コンテナ名。
    pub fn container_name(&self) -> &str {
        self.store.container_name()
    }

    /// ローカルファイルをアップロードし、BlobのURLを返す。
    ///
    /// `blob_name` が空ならファイル名を使う。
    pub async fn upload_from_path(
        &self,
        local_path: &str,
        blob_name: Option<&str>,
    ) -> Result<String, UploadError> {
        tracing::info!(local_path, "ローカルファイルをアップロードします");

        if !has_text(local_path) {
            return Err(UploadError::InvalidArgument(
                "Local file path cannot be empty".to_string(),
            ));
        }

        let path = Path::new(local_path);
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UploadError::InvalidArgument(format!(
                    "File does not exist: {local_path}"
                )));
            }
            Err(e) => {
                return Err(UploadError::InvalidArgument(format!(
                    "Cannot read file: {local_path} ({e})"
                )));
            }
        };
        if !metadata.is_file() {
            return Err(UploadError::InvalidArgument(format!(
                "Cannot read file: {local_path} (not a regular file)"
            )));
        }

        let data = tokio::fs::read(path).await.map_err(|e| {
            UploadError::InvalidArgument(format!("Cannot read file: {local_path} ({e})"))
        })?;

        let blob_name = match blob_name.filter(|n| has_text(n)) {
            Some(name) => name.to_string(),
            None => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    UploadError::InvalidArgument(format!(
                        "Cannot derive a blob name from path: {local_path}"
                    ))
                })?,
        };

        self.store
            .put(&blob_name, Bytes::from(data), DEFAULT_CONTENT_TYPE)
            .await
            .map_err(|e| {
                tracing::error!(blob_name = %blob_name, error = %e, "ファイルのアップロードに失敗");
                UploadError::Io(e.to_string())
            })?;

        tracing::info!(blob_name = %blob_name, "ファイルのアップロードが完了");
        Ok(self.store.blob_url(&blob_name))
    }

    /// ストリームの内容をアップロードし、BlobのURLを返す。
    ///
    /// 同名のBlobは上書きされる。`content_type` が空なら application/octet-stream。
    pub async fn upload_from_stream<R>(
        &self,
        mut reader: R,
        blob_name: &str,
        content_type: Option<&str>,
    ) -> Result<String, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        tracing::info!(blob_name, ?content_type, "ストリームをアップロードします");

        if !has_text(blob_name) {
            return Err(UploadError::InvalidArgument(
                "Blob name cannot be empty for stream upload.".to_string(),
            ));
        }
        let content_type = content_type
            .filter(|c| has_text(c))
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut data = Vec::new();
        reader.read_to_end(&mut data).await.map_err(|e| {
            tracing::error!(blob_name, error = %e, "アップロードストリームの読み込みに失敗");
            UploadError::Io(format!("failed to read upload stream: {e}"))
        })?;

        self.store
            .put(blob_name, Bytes::from(data), content_type)
            .await
            .map_err(|e| {
                tracing::error!(blob_name, error = %e, "ストリームのアップロードに失敗");
                UploadError::Io(e.to_string())
            })?;

        tracing::info!(blob_name, "ストリームのアップロードが完了");
        Ok(self.store.blob_url(blob_name))
    }

    /// コンテナ内の全Blob名。バックエンド障害時は空の一覧を返す。
    pub async fn list_blobs(&self) -> Vec<String> {
        tracing::info!(container = %self.store.container_name(), "Blob一覧を取得します");
        match self.store.list().await {
            Ok(names) => {
                tracing::info!(count = names.len(), "Blob一覧を取得");
                names
            }
            Err(e) => {
                tracing::error!(error = %e, "Blob一覧の取得に失敗");
                Vec::new()
            }
        }
    }

    /// Blobを削除する。名前が空、存在しない、バックエンド障害のいずれでも false。
    pub async fn delete_blob(&self, blob_name: &str) -> bool {
        tracing::info!(blob_name, "Blobを削除します");
        if !has_text(blob_name) {
            tracing::error!("Blob名が空です");
            return false;
        }

        let result = async {
            if !self.store.exists(blob_name).await? {
                return Err(StoreError::NotFound(blob_name.to_string()));
            }
            self.store.delete(blob_name).await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(blob_name, "Blobを削除しました");
                true
            }
            Err(e) => {
                log_swallowed("削除", blob_name, &e);
                false
            }
        }
    }

    /// Blobをローカルファイルにダウンロードする。保存先の親ディレクトリは作成する。
    ///
    /// 入力が空、存在しない、バックエンドまたはローカルI/Oの障害のいずれでも false。
    pub async fn download_blob(&self, blob_name: &str, destination_path: &str) -> bool {
        tracing::info!(blob_name, destination_path, "Blobをダウンロードします");
        if !has_text(blob_name) || !has_text(destination_path) {
            tracing::error!("Blob名と保存先パスは必須です");
            return false;
        }

        let destination = Path::new(destination_path);
        let result = async {
            if !self.store.exists(blob_name).await? {
                return Err(StoreError::NotFound(blob_name.to_string()));
            }
            if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            self.store.download_to(blob_name, destination).await
        }
        .await;

        match result {
            Ok(()) => {
                tracing::info!(blob_name, destination_path, "Blobをダウンロードしました");
                true
            }
            Err(e) => {
                log_swallowed("ダウンロード", blob_name, &e);
                false
            }
        }
    }

    /// Blobの内容を文字列として返す（UTF-8、不正なバイト列は置換文字）。
    ///
    /// 名前が空、存在しない、バックエンド障害のいずれでも None。
    pub async fn blob_content(&self, blob_name: &str) -> Option<String> {
        tracing::info!(blob_name, "Blobの内容を取得します");
        if !has_text(blob_name) {
            tracing::error!("Blob名が空です");
            return None;
        }

        let result = async {
            if !self.store.exists(blob_name).await? {
                return Err(StoreError::NotFound(blob_name.to_string()));
            }
            self.store.get(blob_name).await
        }
        .await;

        match result {
            Ok(data) => Some(String::from_utf8_lossy(&data).into_owned()),
            Err(e) => {
                log_swallowed("内容取得", blob_name, &e);
                None
            }
        }
    }
}

/// 結果に変換して握りつぶすエラーを記録する。存在しないBlobは warn、それ以外は error。
fn log_swallowed(op: &str, blob_name: &str, err: &StoreError) {
    match err {
        StoreError::NotFound(_) => tracing::warn!(blob_name, "Blobが存在しません ({op})"),
        other => tracing::error!(blob_name, error = %other, "Blobの{op}に失敗"),
    }
}
