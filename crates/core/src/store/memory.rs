//! # インメモリ BlobStore
//!
//! プロセス内のマップにBlobを保持する。プロセス終了で内容は失われる。
//! テストと、ストレージなしで Gateway を動かすローカル開発で使う。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;
use tokio::sync::RwLock;

use super::BlobStore;
use crate::error::StoreError;

/// 保存されたBlob。
#[derive(Debug, Clone)]
struct StoredBlob {
    data: Bytes,
    content_type: String,
}

/// インメモリのBlobStore実装。一覧は名前順。
pub struct MemoryBlobStore {
    container: String,
    created: AtomicBool,
    blobs: RwLock<BTreeMap<String, StoredBlob>>,
}

impl MemoryBlobStore {
    /// 空のストアを作成する。コンテナは `ensure_container` で作成される。
    pub fn new(container: &str) -> Self {
        Self {
            container: container.to_string(),
            created: AtomicBool::new(false),
            blobs: RwLock::new(BTreeMap::new()),
        }
    }

    /// 保存時に指定されたコンテンツタイプ。
    pub async fn content_type(&self, blob_name: &str) -> Option<String> {
        self.blobs
            .read()
            .await
            .get(blob_name)
            .map(|b| b.content_type.clone())
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    fn container_name(&self) -> &str {
        &self.container
    }

    async fn ensure_container(&self) -> Result<(), StoreError> {
        if !self.created.swap(true, Ordering::SeqCst) {
            tracing::info!(container = %self.container, "インメモリコンテナを作成");
        }
        Ok(())
    }

    fn blob_url(&self, blob_name: &str) -> String {
        format!("memory://{}/{blob_name}", self.container)
    }

    async fn put(
        &self,
        blob_name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.blobs.write().await.insert(
            blob_name.to_string(),
            StoredBlob {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn exists(&self, blob_name: &str) -> Result<bool, StoreError> {
        Ok(self.blobs.read().await.contains_key(blob_name))
    }

    async fn get(&self, blob_name: &str) -> Result<Bytes, StoreError> {
        self.blobs
            .read()
            .await
            .get(blob_name)
            .map(|b| b.data.clone())
            .ok_or_else(|| StoreError::NotFound(blob_name.to_string()))
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.blobs.read().await.keys().cloned().collect())
    }

    async fn delete(&self, blob_name: &str) -> Result<(), StoreError> {
        self.blobs
            .write()
            .await
            .remove(blob_name)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(blob_name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_overwrites_and_keeps_content_type() {
        let store = MemoryBlobStore::new("uploads");
        store.ensure_container().await.unwrap();
        store.ensure_container().await.unwrap();

        store
            .put("a.txt", Bytes::from_static(b"first"), "text/plain")
            .await
            .unwrap();
        store
            .put("a.txt", Bytes::from_static(b"second"), "application/json")
            .await
            .unwrap();

        assert_eq!(store.get("a.txt").await.unwrap(), Bytes::from_static(b"second"));
        assert_eq!(
            store.content_type("a.txt").await.as_deref(),
            Some("application/json")
        );
        assert_eq!(store.list().await.unwrap(), vec!["a.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let store = MemoryBlobStore::new("uploads");
        assert!(!store.exists("nope").await.unwrap());
        assert!(matches!(store.get("nope").await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("nope").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_default_download_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.bin");

        let store = MemoryBlobStore::new("uploads");
        store
            .put("b.bin", Bytes::from_static(&[1, 2, 3]), "application/octet-stream")
            .await
            .unwrap();
        store.download_to("b.bin", &dest).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), vec![1, 2, 3]);
        assert_eq!(store.blob_url("b.bin"), "memory://uploads/b.bin");
    }
}
