//! # Gatewayエンドポイント
//!
//! すべて `/api/files` 以下に配置する（`/` のアップロードページを除く）。

/// APIのベースパス
pub const API_BASE_PATH: &str = "/api/files";

pub mod content;
pub mod delete;
pub mod download;
pub mod fallback;
pub mod index;
pub mod list;
pub mod upload;
pub mod upload_base64;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use content::handle_content;
pub use delete::handle_delete;
pub use download::handle_download;
pub use fallback::{handle_method_fallback, handle_not_found};
pub use index::handle_index;
pub use list::handle_list;
pub use upload::handle_upload;
pub use upload_base64::handle_upload_base64;
