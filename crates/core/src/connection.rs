//! # 接続文字列
//!
//! ストレージアカウントへの接続情報を1つの文字列で受け取る。
//!
//! 形式: `Endpoint=http://localhost:9000;AccessKey=...;SecretKey=...;Region=us-east-1`
//!
//! - キーは大文字小文字を区別しない
//! - 空のセグメント（末尾の `;` 等）は無視する
//! - `AccessKey` と `SecretKey` を両方省略した場合は匿名アクセス

use std::fmt;
use std::str::FromStr;

use crate::error::ConnectionStringError;

/// リージョンを検出できない場合のフォールバック。
const FALLBACK_REGION: &str = "us-east-1";

/// パース済みの接続文字列。
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// バックエンドのエンドポイントURL
    pub endpoint: String,
    /// アクセスキーID
    pub access_key: Option<String>,
    /// シークレットキー
    pub secret_key: Option<String>,
    /// 明示的に指定されたリージョン
    pub region: Option<String>,
    /// パススタイルURL（`endpoint/container/key`）を使うか
    pub path_style: bool,
}

impl ConnectionString {
    /// 使用するリージョンを返す。
    ///
    /// 明示指定がなければAWS S3エンドポイント（s3.REGION.amazonaws.com）から検出し、
    /// それ以外のエンドポイントでは us-east-1 を使う。
    pub fn region(&self) -> String {
        if let Some(region) = &self.region {
            return region.clone();
        }
        self.endpoint
            .find("s3.")
            .and_then(|start| {
                let rest = &self.endpoint[start + 3..];
                rest.find(".amazonaws.com").map(|end| rest[..end].to_string())
            })
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| FALLBACK_REGION.to_string())
    }

    /// 認証情報を持つか（匿名アクセスでないか）。
    pub fn has_credentials(&self) -> bool {
        self.access_key.is_some() && self.secret_key.is_some()
    }
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut access_key = None;
        let mut secret_key = None;
        let mut region = None;
        let mut path_style = true;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            // 値に '=' を含む場合（Base64のシークレット等）があるため最初の '=' で分割する
            let (key, value) = segment
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .filter(|(k, _)| !k.is_empty())
                .ok_or_else(|| ConnectionStringError::MalformedSegment(redact(segment)))?;

            match key.to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.trim_end_matches('/').to_string()),
                "accesskey" => access_key = Some(value.to_string()),
                "secretkey" => secret_key = Some(value.to_string()),
                "region" => region = Some(value.to_string()),
                "pathstyle" => {
                    path_style = match value.to_ascii_lowercase().as_str() {
                        "true" | "1" | "yes" => true,
                        "false" | "0" | "no" => false,
                        _ => {
                            return Err(ConnectionStringError::InvalidValue {
                                key: "PathStyle",
                                value: value.to_string(),
                            })
                        }
                    }
                }
                _ => return Err(ConnectionStringError::UnknownKey(key.to_string())),
            }
        }

        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or(ConnectionStringError::MissingKey("Endpoint"))?;

        let access_key = access_key.filter(|k| !k.is_empty());
        let secret_key = secret_key.filter(|k| !k.is_empty());
        if access_key.is_some() != secret_key.is_some() {
            return Err(ConnectionStringError::IncompleteCredentials);
        }

        Ok(Self {
            endpoint,
            access_key,
            secret_key,
            region: region.filter(|r| !r.is_empty()),
            path_style,
        })
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("region", &self.region)
            .field("path_style", &self.path_style)
            .finish()
    }
}

/// エラーメッセージ用にセグメントの値部分を伏せる。
fn redact(segment: &str) -> String {
    match segment.split_once('=') {
        Some((key, _)) => format!("{key}=***"),
        None if segment.chars().count() > 16 => {
            format!("{}...", segment.chars().take(16).collect::<String>())
        }
        None => segment.to_string(),
    }
}
