//! Text helpers for wire payloads.

/// Convert CRLF line endings to LF.
///
/// Destination inventories echo PEM blobs with Windows line endings, local
/// blobs use Unix endings. Comparison happens on the normalized form.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}
