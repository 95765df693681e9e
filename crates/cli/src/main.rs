//! # Blob Uploader CLI
//!
//! Gatewayを経由せずにコンテナを直接操作する。
//!
//! ## コマンド
//! - `uploader-cli upload <path> [--name <blob>]` — ローカルファイルをアップロード
//! - `uploader-cli list` — Blob名の一覧
//! - `uploader-cli delete <blob>` — Blobを削除
//! - `uploader-cli download <blob> <dest>` — ローカルパスへ書き出す
//! - `uploader-cli cat <blob>` — 内容をテキストとして表示

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uploader_core::{BlobService, ConnectionString, S3BlobStore};

#[derive(Parser, Debug)]
#[command(name = "uploader-cli")]
#[command(about = "Operate on a blob storage container")]
struct Cli {
    /// ストレージの接続文字列
    #[arg(long, env = "STORAGE_CONNECTION_STRING", hide_env_values = true)]
    connection_string: String,

    /// 対象コンテナ名
    #[arg(long, env = "STORAGE_CONTAINER_NAME", default_value = "uploads")]
    container: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Upload a local file
    Upload {
        path: String,
        /// Blob name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// List blob names
    List,
    /// Delete a blob
    Delete { name: String },
    /// Write a blob to a local path
    Download { name: String, destination: String },
    /// Print a blob as text
    Cat { name: String },
}

/// コマンドを実行し、結果を `out` に書き出す。
///
/// サービスが false / None を返した操作は失敗として扱う。
async fn execute(service: &BlobService, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Upload { path, name } => {
            let url = service.upload_from_path(&path, name.as_deref()).await?;
            writeln!(out, "{url}")?;
        }
        Command::List => {
            for name in service.list_blobs().await {
                writeln!(out, "{name}")?;
            }
        }
        Command::Delete { name } => {
            if !service.delete_blob(&name).await {
                bail!("Failed to delete blob or blob does not exist: {name}");
            }
            writeln!(out, "deleted {name}")?;
        }
        Command::Download { name, destination } => {
            if !service.download_blob(&name, &destination).await {
                bail!("Failed to download blob or blob does not exist: {name}");
            }
            writeln!(out, "{destination}")?;
        }
        Command::Cat { name } => match service.blob_content(&name).await {
            Some(content) => write!(out, "{content}")?,
            None => bail!("Failed to get blob content or blob does not exist: {name}"),
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let conn: ConnectionString = cli
        .connection_string
        .parse()
        .context("接続文字列の解析に失敗しました")?;
    let store = S3BlobStore::connect(&conn, &cli.container)
        .await
        .with_context(|| format!("コンテナ {} の初期化に失敗しました", cli.container))?;
    let service = BlobService::new(Arc::new(store));

    let mut stdout = std::io::stdout().lock();
    execute(&service, cli.command, &mut stdout).await
}
