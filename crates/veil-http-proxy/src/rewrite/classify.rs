//! Content-type classification for body rewriting.

/// Whether a declared content type is eligible for textual rewriting.
///
/// A coarse substring check, not MIME-parameter-aware: any content type
/// mentioning `text`, `json`, or `xml` is treated as rewritable. False
/// positives are accepted as noise; binary formats that slip through are
/// still delivered, just after a (harmless) lossy text pass.
pub fn is_textual(content_type: &str) -> bool {
    content_type.contains("text") || content_type.contains("json") || content_type.contains("xml")
}
