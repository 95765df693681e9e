//! # Blob名の補助関数

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// 自動生成名のプレフィックス。
const GENERATED_PREFIX: &str = "uploaded-";

/// 直前に払い出したミリ秒タイムスタンプ。
static LAST_GENERATED_MILLIS: AtomicU64 = AtomicU64::new(0);

/// 置換対象の空白文字（ASCIIの空白・タブ・改行・垂直タブ・改ページ・復帰）。
///
/// U+00A0 や U+3000 などの非ASCII空白は対象外。
fn is_name_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// 連続する空白文字を1つのハイフンに置き換える。
///
/// `"my doc.txt"` → `"my-doc.txt"`、`" a  b "` → `"-a-b-"`。
/// 前後の空白も置換対象で、トリムはしない。
pub fn sanitize_blob_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for c in name.chars() {
        if is_name_whitespace(c) {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

/// ファイル名が指定されなかった場合のBlob名を生成する（`uploaded-<UNIXミリ秒>`）。
///
/// 同一ミリ秒内に複数回呼ばれた場合は値を1ずつ進め、プロセス内で重複させない。
pub fn generated_blob_name() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();

    let mut last = LAST_GENERATED_MILLIS.load(Ordering::Relaxed);
    let millis = loop {
        let next = now.max(last + 1);
        match LAST_GENERATED_MILLIS.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break next,
            Err(actual) => last = actual,
        }
    };

    format!("{GENERATED_PREFIX}{millis}")
}

/// 文字列が空白以外の文字を含むか。
pub fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_collapses_whitespace_runs() {
        assert_eq!(sanitize_blob_name("my doc.txt"), "my-doc.txt");
        assert_eq!(sanitize_blob_name("a \t\n b"), "a-b");
        assert_eq!(sanitize_blob_name(" a  b "), "-a-b-");
        assert_eq!(sanitize_blob_name("plain.bin"), "plain.bin");
        assert_eq!(sanitize_blob_name("日本語 ファイル.txt"), "日本語-ファイル.txt");
    }

    #[test]
    fn test_sanitize_only_replaces_ascii_whitespace() {
        assert_eq!(sanitize_blob_name("a\u{00A0}b"), "a\u{00A0}b");
        assert_eq!(sanitize_blob_name("報告\u{3000}書.txt"), "報告\u{3000}書.txt");
        assert_eq!(sanitize_blob_name("a\x0B\x0Cb"), "a-b");
    }

    #[test]
    fn test_generated_names_are_distinct_and_prefixed() {
        let first = generated_blob_name();
        let second = generated_blob_name();
        assert!(first.starts_with(GENERATED_PREFIX));
        assert!(second.starts_with(GENERATED_PREFIX));
        assert_ne!(first, second);

        let a: u64 = first[GENERATED_PREFIX.len()..].parse().unwrap();
        let b: u64 = second[GENERATED_PREFIX.len()..].parse().unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_has_text() {
        assert!(has_text("x"));
        assert!(!has_text(""));
        assert!(!has_text("  \t"));
    }
}
