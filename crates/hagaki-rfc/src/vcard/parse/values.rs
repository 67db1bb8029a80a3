//! vCard value parsers and text decoding helpers.

use crate::vcard::core::{Address, Organization, StructuredName};

/// Unescapes a vCard text value.
///
/// vCard escapes: \n, \N (newline), \, (comma), \; (semicolon), \\ (backslash)
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n' | 'N') => {
                    chars.next();
                    result.push('\n');
                }
                Some(',') => {
                    chars.next();
                    result.push(',');
                }
                Some(';') => {
                    chars.next();
                    result.push(';');
                }
                Some('\\') => {
                    chars.next();
                    result.push('\\');
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Splits a structured value on unescaped semicolons.
///
/// A segment ending in a lone backslash escapes the delimiter, so the
/// backslash-terminated segment merges with the one that follows.
#[must_use]
pub fn split_structured(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev_backslash = false;

    for (i, c) in s.char_indices() {
        if c == '\\' {
            prev_backslash = !prev_backslash;
            continue;
        }

        if c == ';' && !prev_backslash {
            parts.push(&s[start..i]);
            start = i + 1;
        }

        prev_backslash = false;
    }

    parts.push(&s[start..]);
    parts
}

/// Splits a component value on unescaped commas, unescaping each part.
#[must_use]
pub fn split_component(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(',') => {
                    chars.next();
                    current.push(',');
                }
                Some(';') => {
                    chars.next();
                    current.push(';');
                }
                Some('n' | 'N') => {
                    chars.next();
                    current.push('\n');
                }
                Some('\\') => {
                    chars.next();
                    current.push('\\');
                }
                _ => current.push(c),
            }
        } else if c == ',' {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    parts.push(current);
    parts
}

/// Parses a structured name (N property).
///
/// N has 5 components: family;given;additional;prefixes;suffixes.
/// All components are optional.
#[must_use]
pub fn parse_structured_name(value: &str) -> StructuredName {
    let parts = split_structured(value);

    StructuredName {
        family: parts
            .first()
            .map(|s| split_component(s))
            .unwrap_or_default(),
        given: parts.get(1).map(|s| split_component(s)).unwrap_or_default(),
        additional: parts.get(2).map(|s| split_component(s)).unwrap_or_default(),
        prefixes: parts.get(3).map(|s| split_component(s)).unwrap_or_default(),
        suffixes: parts.get(4).map(|s| split_component(s)).unwrap_or_default(),
    }
}

/// Parses an address (ADR property).
///
/// ADR has 7 components: PO Box;Extended;Street;Locality;Region;PostalCode;Country.
#[must_use]
pub fn parse_address(value: &str) -> Address {
    let parts = split_structured(value);

    Address {
        po_box: parts
            .first()
            .map(|s| split_component(s))
            .unwrap_or_default(),
        extended: parts.get(1).map(|s| split_component(s)).unwrap_or_default(),
        street: parts.get(2).map(|s| split_component(s)).unwrap_or_default(),
        locality: parts.get(3).map(|s| split_component(s)).unwrap_or_default(),
        region: parts.get(4).map(|s| split_component(s)).unwrap_or_default(),
        postal_code: parts.get(5).map(|s| split_component(s)).unwrap_or_default(),
        country: parts.get(6).map(|s| split_component(s)).unwrap_or_default(),
    }
}

/// Parses an organization (ORG property).
#[must_use]
pub fn parse_organization(value: &str) -> Organization {
    let parts = split_structured(value);

    Organization {
        name: parts.first().map(|s| unescape_text(s)).unwrap_or_default(),
        units: parts.iter().skip(1).map(|s| unescape_text(s)).collect(),
    }
}

/// Decodes text bytes as UTF-8, falling back to ISO-8859-1.
///
/// Legacy exporters produce Latin-1 cards; every Latin-1 byte maps directly
/// to the Unicode code point of the same value, so the fallback is lossless.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Decodes a QUOTED-PRINTABLE value (RFC 2045 §6.7) to text.
///
/// Soft line breaks (`=` at end of line) are removed; `=XX` hex escapes
/// become the named byte. Malformed escapes pass through verbatim.
#[must_use]
pub fn decode_quoted_printable(s: &str) -> String {
    let mut bytes: Vec<u8> = Vec::with_capacity(s.len());
    let input = s.as_bytes();
    let mut i = 0;

    while i < input.len() {
        let b = input[i];
        if b == b'=' {
            // Soft break: = followed by CRLF or LF
            if input.get(i + 1) == Some(&b'\r') && input.get(i + 2) == Some(&b'\n') {
                i += 3;
                continue;
            }
            if input.get(i + 1) == Some(&b'\n') {
                i += 2;
                continue;
            }
            // Hex escape
            if let (Some(&hi), Some(&lo)) = (input.get(i + 1), input.get(i + 2)) {
                let hex = [hi, lo];
                if let Ok(hex_str) = std::str::from_utf8(&hex)
                    && let Ok(byte) = u8::from_str_radix(hex_str, 16)
                {
                    bytes.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        bytes.push(b);
        i += 1;
    }

    decode_text(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_text_newline() {
        assert_eq!(unescape_text(r"Line1\nLine2"), "Line1\nLine2");
        assert_eq!(unescape_text(r"Line1\NLine2"), "Line1\nLine2");
    }

    #[test]
    fn unescape_text_special() {
        assert_eq!(unescape_text(r"a\,b\;c\\d"), "a,b;c\\d");
    }

    #[test]
    fn split_structured_basic() {
        let parts = split_structured("Doe;John;Q;Mr.;Jr.");
        assert_eq!(parts, vec!["Doe", "John", "Q", "Mr.", "Jr."]);
    }

    #[test]
    fn split_structured_escaped_delimiter() {
        let parts = split_structured(r"Doe\;Smith;John");
        assert_eq!(parts, vec![r"Doe\;Smith", "John"]);
    }

    #[test]
    fn split_structured_escaped_backslash_does_not_merge() {
        // A doubled backslash is a literal backslash, not an escape of ';'
        let parts = split_structured(r"Doe\\;John");
        assert_eq!(parts, vec![r"Doe\\", "John"]);
    }

    #[test]
    fn split_component_commas() {
        assert_eq!(split_component("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn parse_structured_name_full() {
        let name = parse_structured_name("Doe;John;Quincy;Mr.;Jr.");
        assert_eq!(name.family, vec!["Doe"]);
        assert_eq!(name.given, vec!["John"]);
        assert_eq!(name.additional, vec!["Quincy"]);
        assert_eq!(name.prefixes, vec!["Mr."]);
        assert_eq!(name.suffixes, vec!["Jr."]);
    }

    #[test]
    fn parse_address_full() {
        let addr = parse_address(";;123 Main St;Anytown;CA;12345;USA");
        assert!(addr.po_box.is_empty());
        assert_eq!(addr.street, vec!["123 Main St"]);
        assert_eq!(addr.locality, vec!["Anytown"]);
    }

    #[test]
    fn parse_organization_with_units() {
        let org = parse_organization("Acme Inc.;Engineering;Backend Team");
        assert_eq!(org.name, "Acme Inc.");
        assert_eq!(org.units, vec!["Engineering", "Backend Team"]);
    }

    #[test]
    fn decode_text_utf8_passthrough() {
        assert_eq!(decode_text("Müller".as_bytes()), "Müller");
    }

    #[test]
    fn decode_text_latin1_fallback() {
        // 0xFC is ü in ISO-8859-1 and invalid as a standalone UTF-8 byte
        assert_eq!(decode_text(&[b'M', 0xFC, b'l', b'l', b'e', b'r']), "Müller");
    }

    #[test]
    fn decode_qp_hex_escapes() {
        assert_eq!(decode_quoted_printable("M=C3=BCller"), "Müller");
    }

    #[test]
    fn decode_qp_latin1_escapes() {
        assert_eq!(decode_quoted_printable("M=FCller"), "Müller");
    }

    #[test]
    fn decode_qp_soft_break() {
        assert_eq!(decode_quoted_printable("Jo=\r\nhn"), "John");
        assert_eq!(decode_quoted_printable("Jo=\nhn"), "John");
    }

    #[test]
    fn decode_qp_malformed_passthrough() {
        assert_eq!(decode_quoted_printable("50=ZZ off"), "50=ZZ off");
    }
}
