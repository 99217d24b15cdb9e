//! Body decoding for the rewrite pipeline.

use crate::error::ProxyError;
use flate2::read::GzDecoder;
use std::io::Read;

/// Decode a buffered response body to text according to its declared
/// `Content-Encoding`.
///
/// `gzip` bodies are decompressed; a malformed gzip stream is a hard
/// [`ProxyError::BodyDecode`]. Any other encoding value, including the empty
/// string, is passed through byte-for-byte and interpreted as raw text.
/// Invalid UTF-8 is replaced rather than rejected: the classifier already
/// tolerates false positives, and a replacement character is less harmful
/// than failing the response.
///
/// The whole body is buffered as a single string. Substitutions can span
/// byte boundaries unpredictably, so there is no streaming rewrite; the
/// caller strips `Content-Encoding`, `Content-Length`, and
/// `Transfer-Encoding` afterwards and sends the rewritten text uncompressed.
pub fn decode(body: &[u8], content_encoding: &str) -> Result<String, ProxyError> {
    if content_encoding == "gzip" {
        let mut decoder = GzDecoder::new(body);
        let mut decoded = Vec::new();
        decoder
            .read_to_end(&mut decoded)
            .map_err(|e| ProxyError::body_decode(format!("gzip reader error: {e}")))?;
        Ok(String::from_utf8_lossy(&decoded).into_owned())
    } else {
        Ok(String::from_utf8_lossy(body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(text: &str) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_identity() {
        let decoded = decode(b"hello origin.example", "").unwrap();
        assert_eq!(decoded, "hello origin.example");
    }

    #[test]
    fn test_decode_unknown_encoding_is_identity() {
        // Anything that is not gzip passes through byte-for-byte.
        let decoded = decode(b"raw bytes", "br").unwrap();
        assert_eq!(decoded, "raw bytes");
    }

    #[test]
    fn test_decode_gzip() {
        let body = gzip("a page mentioning origin.example twice: origin.example");
        let decoded = decode(&body, "gzip").unwrap();
        assert!(decoded.contains("origin.example twice"));
    }

    #[test]
    fn test_decode_malformed_gzip_is_error() {
        let err = decode(b"definitely not a gzip stream", "gzip").unwrap_err();
        assert!(matches!(err, ProxyError::BodyDecode { .. }));
        assert!(err.to_string().contains("gzip reader error"));
    }

    #[test]
    fn test_decode_truncated_gzip_is_error() {
        let mut body = gzip("some compressed text");
        body.truncate(body.len() / 2);
        assert!(decode(&body, "gzip").is_err());
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let decoded = decode(&[0x68, 0x69, 0xff, 0xfe], "").unwrap();
        assert!(decoded.starts_with("hi"));
    }
}
