//! Decoding of child-process output in the host's preferred text encoding.
//!
//! Unlike file reads, decoding here never fails: malformed sequences are
//! replaced with U+FFFD.

use encoding_rs::{Encoding, UTF_8};

/// Locale variables consulted, highest precedence first.
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_CTYPE", "LANG"];

/// Pick the encoding for process output.
///
/// An explicit `label` wins; otherwise the charset of the host locale is
/// used, falling back to UTF-8.
pub fn output_encoding(label: Option<&str>) -> &'static Encoding {
    let label = match label {
        Some(label) => Some(label.to_string()),
        None => locale_charset(|name| std::env::var(name).ok()),
    };
    match label {
        Some(label) => lookup(&label).unwrap_or_else(|| {
            tracing::warn!(%label, "unknown output encoding, using UTF-8");
            UTF_8
        }),
        None => UTF_8,
    }
}

/// Decode `bytes`, substituting undecodable sequences.
pub fn decode_lossy(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Extract the charset from the first non-empty locale variable, e.g.
/// `ja_JP.eucJP@cjknarrow` yields `eucJP`. `C` and `POSIX` imply UTF-8.
fn locale_charset(var: impl Fn(&str) -> Option<String>) -> Option<String> {
    let locale = LOCALE_VARS
        .iter()
        .filter_map(|&name| var(name))
        .find(|value| !value.is_empty())?;
    if locale == "C" || locale == "POSIX" {
        return Some("utf-8".into());
    }
    let (_, charset) = locale.split_once('.')?;
    let charset = charset.split('@').next().unwrap_or(charset);
    Some(charset.to_string())
}

/// Map a charset name onto an `encoding_rs` encoding, accepting common
/// locale and Windows code page spellings.
fn lookup(label: &str) -> Option<&'static Encoding> {
    let normalized = label.trim().to_ascii_lowercase();
    if let Some(encoding) = Encoding::for_label(normalized.as_bytes()) {
        return Some(encoding);
    }
    let alias = match normalized.as_str() {
        "cp932" | "sjis" | "mskanji" => "shift_jis".to_string(),
        "eucjp" | "ujis" => "euc-jp".to_string(),
        "euckr" => "euc-kr".to_string(),
        "cp936" => "gbk".to_string(),
        "cp949" => "euc-kr".to_string(),
        "cp950" | "big5hkscs" => "big5".to_string(),
        "cp65001" => "utf-8".to_string(),
        other => match other.strip_prefix("cp") {
            Some(page) => format!("windows-{page}"),
            None => return None,
        },
    };
    Encoding::for_label(alias.as_bytes())
}
