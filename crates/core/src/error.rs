//! # Core エラー型

/// 接続文字列のパースエラー。
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionStringError {
    /// `Key=Value` 形式になっていないセグメント
    #[error("接続文字列のセグメントが不正です: '{0}'")]
    MalformedSegment(String),
    /// 未知のキー
    #[error("接続文字列に未知のキーがあります: {0}")]
    UnknownKey(String),
    /// 必須キーの欠落
    #[error("接続文字列に {0} がありません")]
    MissingKey(&'static str),
    /// AccessKey と SecretKey の片方のみ指定
    #[error("AccessKey と SecretKey は両方指定する必要があります")]
    IncompleteCredentials,
    /// 値の形式が不正（PathStyle=maybe 等）
    #[error("接続文字列の {key} の値が不正です: {value}")]
    InvalidValue {
        /// キー名
        key: &'static str,
        /// 指定された値
        value: String,
    },
}

/// ストレージバックエンド操作のエラー。
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Blobが存在しない
    #[error("Blob does not exist: {0}")]
    NotFound(String),
    /// バックエンドが返したエラー（通信失敗、認証失敗、非2xx応答）
    #[error("storage backend error: {0}")]
    Backend(String),
    /// ローカルファイルの入出力エラー
    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// アップロード操作のエラー。
///
/// 一覧・削除等と異なり、アップロードは失敗理由を呼び出し元に返す。
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// 入力が不正（空のBlob名、存在しない/読めないパス）
    #[error("{0}")]
    InvalidArgument(String),
    /// ストリーム読み込みまたはバックエンドへの書き込みに失敗
    #[error("{0}")]
    Io(String),
}
