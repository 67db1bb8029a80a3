//! Shared constants for routing and the CardDAV protocol surface.

/// Leading path component for all CardDAV routes.
pub const CARDDAV_ROUTE_COMPONENT: &str = "carddav";

/// Path component under which addressbook homes live.
pub const ADDRESSBOOKS_ROUTE_COMPONENT: &str = "addressbooks";

/// Full route prefix for CardDAV resources.
pub const CARDDAV_ROUTE_PREFIX: &str = "/carddav";

/// PRODID stamped into cards that lack one.
pub const PRODID: &str = "-//hagaki//NONSGML hagaki contacts//EN";

/// Prefix for DAV sync tokens; the suffix is the addressbook ctag.
pub const SYNC_TOKEN_PREFIX: &str = "http://hagaki.io/ns/sync/";

/// CardDAV maximum resource size per RFC 6352 §6.2.3 (100 KB).
pub const MAX_VCARD_SIZE: usize = 102_400;

/// File extension for card resources.
pub const VCF_EXTENSION: &str = ".vcf";

/// MIME type for card bodies.
pub const VCARD_CONTENT_TYPE: &str = "text/vcard; charset=utf-8";

/// ## Summary
/// Formats an addressbook ctag as a DAV sync token.
#[must_use]
pub fn format_sync_token(ctag: i64) -> String {
    format!("{SYNC_TOKEN_PREFIX}{ctag}")
}

/// ## Summary
/// Parses a DAV sync token back into a ctag value.
///
/// An empty token means "from the beginning" and maps to ctag 0.
#[must_use]
pub fn parse_sync_token(token: &str) -> Option<i64> {
    if token.is_empty() {
        return Some(0);
    }
    token.strip_prefix(SYNC_TOKEN_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_token_round_trip() {
        let token = format_sync_token(42);
        assert_eq!(parse_sync_token(&token), Some(42));
    }

    #[test]
    fn empty_sync_token_is_initial() {
        assert_eq!(parse_sync_token(""), Some(0));
    }

    #[test]
    fn foreign_sync_token_rejected() {
        assert_eq!(parse_sync_token("http://sabre.io/ns/sync/3"), None);
    }
}
