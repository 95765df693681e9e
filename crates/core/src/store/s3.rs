//! # S3互換 BlobStore 実装
//!
//! AWS S3, MinIO, Cloudflare R2 等のS3互換APIを使用する。
//! コンテナはS3のバケットに対応する。

use std::path::Path;

use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use tokio::io::AsyncWriteExt;

use super::BlobStore;
use crate::connection::ConnectionString;
use crate::error::StoreError;

/// S3互換ストレージによるBlobStore実装。
pub struct S3BlobStore {
    bucket: Bucket,
    container: String,
    /// バケット作成時に再利用する接続情報
    region: Region,
    credentials: Credentials,
    path_style: bool,
}

impl S3BlobStore {
    /// 接続文字列からバケットハンドルを構築する。ネットワークアクセスはしない。
    pub fn new(conn: &ConnectionString, container: &str) -> Result<Self, StoreError> {
        let region = Region::Custom {
            region: conn.region(),
            endpoint: conn.endpoint.clone(),
        };

        let credentials = match (&conn.access_key, &conn.secret_key) {
            (Some(access_key), Some(secret_key)) => Credentials::new(
                Some(access_key.as_str()),
                Some(secret_key.as_str()),
                None,
                None,
                None,
            ),
            _ => Credentials::anonymous(),
        }
        .map_err(|e| StoreError::Backend(format!("認証情報の構築に失敗: {e}")))?;

        let bucket = Bucket::new(container, region.clone(), credentials.clone())
            .map_err(|e| StoreError::Backend(format!("バケットハンドルの構築に失敗: {e}")))?;
        let bucket = if conn.path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self {
            bucket: *bucket,
            container: container.to_string(),
            region,
            credentials,
            path_style: conn.path_style,
        })
    }

    /// バケットハンドルを構築し、コンテナが無ければ作成する。
    ///
    /// 接続・認証の失敗はそのまま返す（起動時の致命的エラー）。
    pub async fn connect(conn: &ConnectionString, container: &str) -> Result<Self, StoreError> {
        tracing::info!(
            endpoint = %conn.endpoint,
            container,
            anonymous = !conn.has_credentials(),
            "S3互換ストレージに接続"
        );
        let store = Self::new(conn, container)?;
        store.ensure_container().await?;
        Ok(store)
    }
}

/// 非2xxのステータスコードをエラーに変換する。
fn check_status(op: &str, blob_name: &str, status: u16) -> Result<(), StoreError> {
    match status {
        200..=299 => Ok(()),
        404 => Err(StoreError::NotFound(blob_name.to_string())),
        _ => Err(StoreError::Backend(format!(
            "{op} が HTTP {status} を返しました: {blob_name}"
        ))),
    }
}

/// S3エラーを変換する。`fail-on-err` 有効時の404も NotFound として扱う。
fn map_s3_error(op: &str, blob_name: &str, err: S3Error) -> StoreError {
    match err {
        S3Error::HttpFailWithBody(404, _) => StoreError::NotFound(blob_name.to_string()),
        other => StoreError::Backend(format!("{op} に失敗 ({blob_name}): {other}")),
    }
}

#[async_trait::async_trait]
impl BlobStore for S3BlobStore {
    fn container_name(&self) -> &str {
        &self.container
    }

    async fn ensure_container(&self) -> Result<(), StoreError> {
        let exists = self
            .bucket
            .exists()
            .await
            .map_err(|e| StoreError::Backend(format!("コンテナの存在確認に失敗: {e}")))?;
        if exists {
            tracing::info!(container = %self.container, "コンテナは作成済み");
            return Ok(());
        }

        tracing::info!(container = %self.container, "コンテナが存在しないため作成します");
        let config = BucketConfiguration::default();
        let response = if self.path_style {
            Bucket::create_with_path_style(
                &self.container,
                self.region.clone(),
                self.credentials.clone(),
                config,
            )
            .await
        } else {
            Bucket::create(
                &self.container,
                self.region.clone(),
                self.credentials.clone(),
                config,
            )
            .await
        }
        .map_err(|e| StoreError::Backend(format!("コンテナの作成に失敗: {e}")))?;

        if !response.success() {
            return Err(StoreError::Backend(format!(
                "コンテナの作成に失敗: HTTP {} - {}",
                response.response_code, response.response_text
            )));
        }
        Ok(())
    }

    fn blob_url(&self, blob_name: &str) -> String {
        format!("{}/{blob_name}", self.bucket.url())
    }

    async fn put(
        &self,
        blob_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        let response = self
            .bucket
            .put_object_with_content_type(blob_name, &data, content_type)
            .await
            .map_err(|e| map_s3_error("PutObject", blob_name, e))?;
        check_status("PutObject", blob_name, response.status_code())
    }

    async fn exists(&self, blob_name: &str) -> Result<bool, StoreError> {
        match self.bucket.head_object(blob_name).await {
            Ok((_, 404)) | Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Ok((_, status)) => check_status("HeadObject", blob_name, status).map(|_| true),
            Err(e) => Err(map_s3_error("HeadObject", blob_name, e)),
        }
    }

    async fn get(&self, blob_name: &str) -> Result<Bytes, StoreError> {
        let response = self
            .bucket
            .get_object(blob_name)
            .await
            .map_err(|e| map_s3_error("GetObject", blob_name, e))?;
        check_status("GetObject", blob_name, response.status_code())?;
        Ok(Bytes::from(response.bytes().to_vec()))
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let pages = self
            .bucket
            .list(String::new(), None)
            .await
            .map_err(|e| StoreError::Backend(format!("ListObjects に失敗: {e}")))?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.contents.into_iter().map(|object| object.key))
            .collect())
    }

    async fn delete(&self, blob_name: &str) -> Result<(), StoreError> {
        let response = self
            .bucket
            .delete_object(blob_name)
            .await
            .map_err(|e| map_s3_error("DeleteObject", blob_name, e))?;
        check_status("DeleteObject", blob_name, response.status_code())
    }

    async fn download_to(&self, blob_name: &str, destination: &Path) -> Result<(), StoreError> {
        let staging = staging_path(destination)?;
        let mut file = tokio::fs::File::create(&staging).await?;
        let result = self
            .bucket
            .get_object_to_writer(blob_name, &mut file)
            .await
            .map_err(|e| map_s3_error("GetObject", blob_name, e))
            .and_then(|status| check_status("GetObject", blob_name, status));
        let result = match result {
            Ok(()) => file.flush().await.map_err(StoreError::from),
            Err(e) => Err(e),
        };
        drop(file);

        match result {
            Ok(()) => {
                if let Err(e) = tokio::fs::rename(&staging, destination).await {
                    remove_staging(&staging).await;
                    return Err(e.into());
                }
                Ok(())
            }
            Err(e) => {
                remove_staging(&staging).await;
                Err(e)
            }
        }
    }
}

/// ダウンロード中の書き込み先（書き出し先と同じディレクトリの `.<name>.part`）。
///
/// 既存の書き出し先は成功時のrenameまで変更しない。
fn staging_path(destination: &Path) -> Result<std::path::PathBuf, StoreError> {
    let file_name = destination.file_name().ok_or_else(|| {
        StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("書き出し先がファイルパスではありません: {}", destination.display()),
        ))
    })?;
    let mut staged = std::ffi::OsString::from(".");
    staged.push(file_name);
    staged.push(".part");
    Ok(destination.with_file_name(staged))
}

async fn remove_staging(staging: &Path) {
    if let Err(e) = tokio::fs::remove_file(staging).await {
        tracing::warn!(path = %staging.display(), error = %e, "一時ファイルの削除に失敗");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(s: &str) -> ConnectionString {
        s.parse().unwrap()
    }

    #[test]
    fn test_path_style_blob_url() {
        let store = S3BlobStore::new(
            &conn("Endpoint=http://localhost:9000;AccessKey=minioadmin;SecretKey=minioadmin"),
            "uploads",
        )
        .unwrap();
        assert_eq!(store.container_name(), "uploads");
        assert_eq!(store.blob_url("a.txt"), "http://localhost:9000/uploads/a.txt");
    }

    #[test]
    fn test_anonymous_store_builds() {
        let store = S3BlobStore::new(&conn("Endpoint=http://localhost:9000"), "public").unwrap();
        assert!(store.blob_url("x").ends_with("/public/x"));
    }

    #[test]
    fn test_status_mapping() {
        assert!(check_status("GetObject", "a", 200).is_ok());
        assert!(matches!(
            check_status("GetObject", "a", 404),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            check_status("GetObject", "a", 503),
            Err(StoreError::Backend(_))
        ));
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        let staged = staging_path(Path::new("/data/out/report.csv")).unwrap();
        assert_eq!(staged, Path::new("/data/out/.report.csv.part"));
        assert!(staging_path(Path::new("/")).is_err());
    }

    /// ダウンロード失敗時は既存の書き出し先を変更しない
    #[tokio::test]
    async fn test_failed_download_keeps_existing_file() {
        let store = S3BlobStore::new(
            &conn("Endpoint=http://127.0.0.1:1;AccessKey=a;SecretKey=b"),
            "uploads",
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("keep.txt");
        std::fs::write(&dest, "existing").unwrap();

        assert!(store.download_to("keep.txt", &dest).await.is_err());
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "existing");
        assert!(!dir.path().join(".keep.txt.part").exists());
    }

    /// 到達不能なエンドポイントへの接続は起動時エラーになる
    #[tokio::test]
    async fn test_connect_fails_for_unreachable_endpoint() {
        let result = S3BlobStore::connect(
            &conn("Endpoint=http://127.0.0.1:1;AccessKey=a;SecretKey=b"),
            "uploads",
        )
        .await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
