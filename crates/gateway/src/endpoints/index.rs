//! # GET /
//!
//! ブラウザ用アップロードページ。

use axum::response::Html;

/// バイナリに埋め込んだ静的ページ
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET / — アップロードページ。
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
