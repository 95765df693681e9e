//! # ストレージバックエンド
//!
//! サービス層とオブジェクトストレージの境界となる `BlobStore` トレイト。
//!
//! ## 実装
//! - `S3BlobStore`: S3互換API（AWS S3, MinIO, Cloudflare R2等）。`vendor-aws` feature
//! - `MemoryBlobStore`: プロセス内のマップ（テスト・ローカル開発用）
//!
//! 各メソッドはバックエンドへの1回の呼び出しに対応する。リトライはしない。

pub mod memory;
#[cfg(feature = "vendor-aws")]
pub mod s3;

pub use memory::MemoryBlobStore;
#[cfg(feature = "vendor-aws")]
pub use s3::S3BlobStore;

use std::path::Path;

use bytes::Bytes;

use crate::error::StoreError;

/// 1つのコンテナに束縛されたオブジェクトストレージのクライアント。
///
/// 起動時に1度だけ構築し、全リクエストで共有する。
/// 実装は並行呼び出しに対して安全でなければならない。
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// 束縛されているコンテナ名。
    fn container_name(&self) -> &str;

    /// コンテナが存在しなければ作成する。何度呼んでもよい。
    async fn ensure_container(&self) -> Result<(), StoreError>;

    /// Blobの公開URL。
    fn blob_url(&self, blob_name: &str) -> String;

    /// Blobを書き込む。同名のBlobがあれば上書きする。
    async fn put(&self, blob_name: &str, data: Bytes, content_type: &str)
        -> Result<(), StoreError>;

    /// Blobが存在するか。
    async fn exists(&self, blob_name: &str) -> Result<bool, StoreError>;

    /// Blobの内容を取得する。存在しなければ `StoreError::NotFound`。
    async fn get(&self, blob_name: &str) -> Result<Bytes, StoreError>;

    /// コンテナ内の全Blob名。順序はバックエンド依存。
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Blobを削除する。
    async fn delete(&self, blob_name: &str) -> Result<(), StoreError>;

    /// Blobをローカルファイルに書き出す。既存ファイルは上書きする。
    ///
    /// 親ディレクトリは呼び出し側で用意すること。
    async fn download_to(&self, blob_name: &str, destination: &Path) -> Result<(), StoreError> {
        let data = self.get(blob_name).await?;
        tokio::fs::write(destination, &data).await?;
        Ok(())
    }
}
