//! # Blob Uploader Gateway
//!
//! オブジェクトストレージのコンテナに対するアップロード・一覧・取得・削除をHTTPで公開する。
//!
//! ## 役割
//! - 起動時にストレージへ接続し、コンテナが無ければ作成する
//! - multipart / Base64 JSON によるアップロード
//! - 結果を `success` を含むフラットなJSONとステータスコードに変換する
//!
//! ## API エンドポイント
//! - `GET /` — アップロードページ
//! - `POST /api/files/upload` — multipartアップロード
//! - `POST /api/files/upload/base64` — Base64アップロード
//! - `GET /api/files/list` — Blob一覧
//! - `DELETE /api/files/{blobName}` — Blob削除
//! - `GET /api/files/download` — サーバー側パスへのダウンロード
//! - `GET /api/files/content/{blobName}` — Blobの内容取得

mod config;
mod endpoints;
mod error;

use std::any::Any;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use tower_http::catch_panic::CatchPanicLayer;
use uploader_core::{BlobService, BlobStore, MemoryBlobStore};

use crate::config::{GatewayConfig, GatewayState};
use crate::endpoints::{
    handle_content, handle_delete, handle_download, handle_index, handle_list,
    handle_method_fallback, handle_not_found, handle_upload, handle_upload_base64, API_BASE_PATH,
};
use crate::error::GatewayError;

/// ハンドラ内のpanicを 500 のJSONレスポンスに変換する。
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "ハンドラでpanicが発生");
    GatewayError::Internal("request handler failed".to_string()).into_response()
}

/// ルーターを構築する。
///
/// 各ルートの非対応メソッドと未定義パスもJSONで応答する。
pub(crate) fn build_router(state: Arc<GatewayState>) -> axum::Router {
    let max_upload_size = state.max_upload_size;

    let api = axum::Router::new()
        .route(
            "/upload",
            post(handle_upload).fallback(handle_method_fallback),
        )
        .route(
            "/upload/base64",
            post(handle_upload_base64).fallback(handle_method_fallback),
        )
        .route("/list", get(handle_list).fallback(handle_method_fallback))
        .route(
            "/download",
            get(handle_download).fallback(handle_method_fallback),
        )
        .route(
            "/content/{blob_name}",
            get(handle_content).fallback(handle_method_fallback),
        )
        .route(
            "/{blob_name}",
            delete(handle_delete).fallback(handle_method_fallback),
        );

    axum::Router::new()
        .route("/", get(handle_index).fallback(handle_method_fallback))
        .nest(API_BASE_PATH, api)
        .fallback(handle_not_found)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// 設定に従ってストアを構築し、コンテナを用意する。
///
/// 接続・認証の失敗は起動を中止する。リトライはしない。
async fn connect_store(config: &GatewayConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    if config.mock_storage {
        tracing::warn!("MemoryBlobStoreで起動します（内容はプロセス終了で失われます）");
        let store = MemoryBlobStore::new(&config.container_name);
        store.ensure_container().await?;
        return Ok(Arc::new(store));
    }

    let raw = config
        .connection_string
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("STORAGE_CONNECTION_STRINGが未設定です"))?;
    let conn: uploader_core::ConnectionString = raw.parse()?;

    #[cfg(feature = "vendor-aws")]
    {
        use anyhow::Context;

        let store = uploader_core::S3BlobStore::connect(&conn, &config.container_name)
            .await
            .with_context(|| {
                format!(
                    "コンテナ {} の初期化に失敗しました（endpoint: {}）",
                    config.container_name, conn.endpoint
                )
            })?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "vendor-aws"))]
    {
        anyhow::bail!(
            "S3互換バックエンドが無効なビルドです（endpoint: {}）。MOCK_STORAGE=true を指定してください",
            conn.endpoint
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;
    let store = connect_store(&config).await?;
    tracing::info!(container = %store.container_name(), "ストレージの初期化完了");

    let state = Arc::new(GatewayState {
        service: BlobService::new(store),
        max_upload_size: config.max_upload_size,
    });

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(
        max_upload_size = config.max_upload_size,
        "Gatewayを {} で起動します",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
