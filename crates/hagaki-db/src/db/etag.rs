//! `ETag` generation functions.

use sha2::{Digest, Sha256};

/// ## Summary
/// Generates an `ETag` from card bytes using SHA256.
///
/// The `ETag` is the hex-encoded SHA256 hash of the content, wrapped in
/// quotes. ETags are always derived from the stored bytes, never persisted;
/// a byte-identical body always yields the same tag.
#[must_use]
pub fn generate_etag(card_bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(card_bytes);
    let hash = hasher.finalize();
    format!("\"{}\"", hex::encode(hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn etag_is_quoted_hex() {
        let etag = generate_etag(b"BEGIN:VCARD");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 66); // 64 hex chars + 2 quotes
    }

    #[test_log::test]
    fn etag_is_deterministic() {
        assert_eq!(generate_etag(b"x"), generate_etag(b"x"));
        assert_ne!(generate_etag(b"x"), generate_etag(b"y"));
    }
}
