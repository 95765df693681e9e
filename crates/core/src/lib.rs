//! # Blob Uploader Core
//!
//! オブジェクトストレージ上のBlobに対する作成・取得・一覧・削除を提供する。
//!
//! ## 構成
//! 1. `connection` — 接続文字列のパース
//! 2. `store` — ストレージバックエンドの抽象（`BlobStore`）と実装
//! 3. `service` — 6つの操作を公開する `BlobService`
//! 4. `naming` — Blob名のサニタイズと自動生成
//!
//! アップロード系の操作はエラーを `Result` で返し、
//! 一覧・削除・ダウンロード・読み取りは失敗を空/false/None に変換する。
//! この非対称性はHTTP層のステータスコード対応に依存されている。

pub mod connection;
pub mod error;
pub mod naming;
pub mod service;
pub mod store;

pub use connection::ConnectionString;
pub use error::{ConnectionStringError, StoreError, UploadError};
pub use service::BlobService;
pub use store::{BlobStore, MemoryBlobStore};

#[cfg(feature = "vendor-aws")]
pub use store::S3BlobStore;
