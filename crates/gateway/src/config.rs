//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。

use anyhow::Context;
use uploader_core::BlobService;

/// コンテナ名のデフォルト。
const DEFAULT_CONTAINER_NAME: &str = "uploads";
/// 待ち受けポートのデフォルト。
const DEFAULT_PORT: u16 = 8080;
/// リクエストボディ上限のデフォルト（10 MiB）。
const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// 起動時に1度だけ解決される設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// ストレージの接続文字列（`STORAGE_CONNECTION_STRING`）
    pub connection_string: Option<String>,
    /// 対象コンテナ名（`STORAGE_CONTAINER_NAME`）
    pub container_name: String,
    /// 待ち受けポート（`PORT`）
    pub port: u16,
    /// リクエストボディの上限バイト数（`MAX_UPLOAD_SIZE`）
    pub max_upload_size: usize,
    /// インメモリストアを使うか（`MOCK_STORAGE=true`）
    pub mock_storage: bool,
}

impl GatewayConfig {
    /// プロセスの環境変数から読み込む。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から読み込む。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mock_storage = lookup("MOCK_STORAGE").unwrap_or_default() == "true";

        let connection_string = lookup("STORAGE_CONNECTION_STRING").filter(|s| !s.trim().is_empty());
        if connection_string.is_none() && !mock_storage {
            anyhow::bail!(
                "STORAGE_CONNECTION_STRINGが未設定です（ストレージなしで起動する場合は MOCK_STORAGE=true）"
            );
        }

        let container_name = lookup("STORAGE_CONTAINER_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string());

        let port = match lookup("PORT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("PORTは0〜65535の整数である必要があります: {v}"))?,
            None => DEFAULT_PORT,
        };

        let max_upload_size = match lookup("MAX_UPLOAD_SIZE") {
            Some(v) => v
                .parse()
                .with_context(|| format!("MAX_UPLOAD_SIZEはバイト数である必要があります: {v}"))?,
            None => DEFAULT_MAX_UPLOAD_SIZE,
        };

        Ok(Self {
            connection_string,
            container_name,
            port,
            max_upload_size,
            mock_storage,
        })
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// Blob操作サービス（起動時に構築したストアを保持）
    pub service: BlobService,
    /// リクエストボディの上限バイト数
    pub max_upload_size: usize,
}
