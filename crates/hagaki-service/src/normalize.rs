//! vCard normalization for cards entering through untrusted paths
//! (web/API add, import).
//!
//! Freshly parsed cards pass through, in order: a legacy upgrade (vCard 2.1
//! QUOTED-PRINTABLE values and positional TYPE parameters), encoding
//! normalization, FN/N/UID derivation, and REV/PRODID stamping. Cards
//! arriving through the `CardDAV` write path are trusted as client-authored
//! and skip everything except VERSION/PRODID stamping.

use std::collections::HashSet;

use hagaki_core::constants::{PRODID, VCF_EXTENSION};
use hagaki_rfc::vcard::core::names;
use hagaki_rfc::vcard::parse::{decode_quoted_printable, decode_text, parse_single};
use hagaki_rfc::vcard::{
    StructuredName, VCard, VCardProperty, VCardValue, VCardVersion, serialize_single,
};

use crate::error::{ServiceError, ServiceResult};

/// Retry budget for the UID collision probe. The original looped without
/// bound; exhaustion here is surfaced as a distinct error instead.
pub const MAX_UID_ATTEMPTS: usize = 100;

/// A card that has passed normalization and is ready for storage.
#[derive(Debug, Clone)]
pub struct NormalizedCard {
    pub vcard: VCard,
    pub uid: String,
    pub uri: String,
    pub full_name: String,
}

impl NormalizedCard {
    /// Serializes the normalized card for storage.
    #[must_use]
    pub fn carddata(&self) -> String {
        serialize_single(&self.vcard)
    }
}

/// ## Summary
/// Runs the full normalization pass over a raw card payload.
///
/// `taken_uris` is the set of resource uris already present in the target
/// addressbook, used by the UID collision probe. `fallback_name` is the
/// display name of last resort (localized by the caller).
///
/// ## Errors
/// Returns `Malformed` for unparseable payloads and `UidProbeExhausted`
/// when the capped collision probe runs dry.
#[tracing::instrument(skip_all, fields(raw_len = raw.len()))]
pub fn normalize_card(
    raw: &[u8],
    taken_uris: &HashSet<String>,
    fallback_name: &str,
) -> ServiceResult<NormalizedCard> {
    let text = decode_text(raw);
    let vcard = parse_single(&text).map_err(|e| ServiceError::Malformed(e.to_string()))?;

    normalize_parsed(vcard, taken_uris, fallback_name)
}

/// ## Summary
/// Runs the normalization pass over an already-parsed card (the batch
/// import path parses once and normalizes each card separately).
///
/// ## Errors
/// Returns `UidProbeExhausted` when the capped collision probe runs dry.
pub fn normalize_parsed(
    mut vcard: VCard,
    taken_uris: &HashSet<String>,
    fallback_name: &str,
) -> ServiceResult<NormalizedCard> {
    if vcard.version.is_legacy() {
        upgrade_legacy(&mut vcard);
    }

    normalize_encoding(&mut vcard);
    ensure_fn(&mut vcard, fallback_name);
    ensure_n(&mut vcard);
    let uid = ensure_uid(&mut vcard, taken_uris)?;
    stamp(&mut vcard);

    let full_name = vcard.formatted_name().unwrap_or(fallback_name).to_string();
    let uri = format!("{uid}{VCF_EXTENSION}");

    Ok(NormalizedCard {
        vcard,
        uid,
        uri,
        full_name,
    })
}

/// ## Summary
/// The trusted path for client-authored cards (`CardDAV` PUT): stores the
/// card verbatim apart from VERSION/PRODID stamping.
pub fn stamp_trusted(vcard: &mut VCard) {
    if vcard.version.is_legacy() {
        // Legacy cards can't be stored as-is; PUT clients don't send 2.1,
        // but imports routed here defensively still get upgraded.
        upgrade_legacy(vcard);
    }
    if !vcard.has_property(names::PRODID) {
        vcard.add_property(VCardProperty::text(names::PRODID, PRODID));
    }
}

/// Upgrade pass for VERSION < 3.0: decode QUOTED-PRINTABLE values and
/// rewrite positional TYPE parameters (`TEL;HOME;CELL:`) to the explicit
/// `TYPE=HOME,CELL` form.
fn upgrade_legacy(vcard: &mut VCard) {
    for prop in &mut vcard.properties {
        let quoted_printable = prop
            .get_param("ENCODING")
            .is_some_and(|p| p.has_value("QUOTED-PRINTABLE"));

        if quoted_printable {
            let decoded = decode_quoted_printable(&prop.raw_value);
            prop.raw_value = decoded.clone();
            if matches!(prop.value, VCardValue::Text(_) | VCardValue::Unknown(_)) {
                prop.value = VCardValue::Text(decoded);
            }
            prop.remove_param("ENCODING");
        }

        // CHARSET is meaningless once everything is UTF-8
        prop.remove_param("CHARSET");

        let bare_types: Vec<String> = prop
            .params
            .iter()
            .filter(|p| p.is_bare())
            .map(|p| p.name.clone())
            .collect();

        if !bare_types.is_empty() {
            prop.params.retain(|p| !p.is_bare());
            for type_value in bare_types {
                prop.add_type(type_value);
            }
        }
    }

    vcard.version = VCardVersion::V3;
}

/// Collapses line endings to `\n` and strips embedded markup from
/// string-valued properties.
fn normalize_encoding(vcard: &mut VCard) {
    for prop in &mut vcard.properties {
        if let VCardValue::Text(s) = &prop.value {
            let cleaned = strip_markup(&normalize_line_endings(s));
            if cleaned != *s {
                prop.value = VCardValue::Text(cleaned);
            }
        }
    }
}

fn normalize_line_endings(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Removes `<...>` markup sequences from a value.
fn strip_markup(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;

    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    result
}

/// Derives FN when missing: prefer N (unless it is the empty `;;;;`
/// placeholder), else the first EMAIL, else ORG, else the fallback name.
fn ensure_fn(vcard: &mut VCard, fallback_name: &str) {
    let has_fn = vcard
        .formatted_name()
        .is_some_and(|fn_value| !fn_value.trim().is_empty());
    if has_fn {
        return;
    }

    let derived = vcard
        .name()
        .filter(|n| !n.is_empty())
        .map(StructuredName::display)
        .or_else(|| vcard.emails().first().map(ToString::to_string))
        .or_else(|| {
            vcard
                .organization()
                .filter(|org| !org.name.trim().is_empty())
                .map(|org| org.name.clone())
        })
        .unwrap_or_else(|| fallback_name.to_string());

    vcard.remove_properties(names::FN);
    vcard.add_property(VCardProperty::text(names::FN, derived));
}

/// Derives N when missing or empty: the two leading space-separated tokens
/// of FN, reversed, as family;given with empty remaining components.
fn ensure_n(vcard: &mut VCard) {
    let present = vcard.name().is_some_and(|n| !n.is_empty());
    if present {
        return;
    }

    let Some(fn_value) = vcard.formatted_name().map(ToString::to_string) else {
        return;
    };

    let mut tokens = fn_value.split_whitespace().take(2);
    let first = tokens.next().unwrap_or_default().to_string();
    let second = tokens.next().map(ToString::to_string);

    // Reversed: with two tokens the second is the family name
    let name = match second {
        Some(family) => StructuredName {
            family: vec![family],
            given: vec![first],
            ..StructuredName::default()
        },
        None => StructuredName {
            family: vec![first],
            ..StructuredName::default()
        },
    };

    let raw_value = {
        let prop = VCardProperty {
            group: None,
            name: names::N.to_string(),
            params: Vec::new(),
            value: VCardValue::StructuredName(name.clone()),
            raw_value: String::new(),
        };
        hagaki_rfc::vcard::serialize_property(&prop)
            .split_once(':')
            .map(|(_, v)| v.to_string())
            .unwrap_or_default()
    };

    vcard.remove_properties(names::N);
    vcard.add_property(VCardProperty {
        group: None,
        name: names::N.to_string(),
        params: Vec::new(),
        value: VCardValue::StructuredName(name),
        raw_value,
    });
}

/// Ensures a UID whose `<uid>.vcf` uri does not collide inside the target
/// addressbook. Missing UIDs get a generated one; collisions retry with
/// random 10-character hex tokens, bounded by [`MAX_UID_ATTEMPTS`].
fn ensure_uid(vcard: &mut VCard, taken_uris: &HashSet<String>) -> ServiceResult<String> {
    if let Some(uid) = vcard.uid() {
        let uid = uid.to_string();
        if !uid.trim().is_empty() {
            return Ok(uid);
        }
        vcard.remove_properties(names::UID);
    }

    let mut candidate = uuid::Uuid::new_v4().simple().to_string();

    for _ in 0..MAX_UID_ATTEMPTS {
        let uri = format!("{candidate}{VCF_EXTENSION}");
        if !taken_uris.contains(&uri) {
            vcard.add_property(VCardProperty::text(names::UID, candidate.clone()));
            return Ok(candidate);
        }
        candidate = random_hex_token();
    }

    Err(ServiceError::UidProbeExhausted(MAX_UID_ATTEMPTS))
}

/// A random 10-character hex token for UID collision retries.
fn random_hex_token() -> String {
    let mut token = uuid::Uuid::new_v4().simple().to_string();
    token.truncate(10);
    token
}

/// Stamps REV with the current W3C-DTF timestamp and PRODID if absent.
fn stamp(vcard: &mut VCard) {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    vcard.remove_properties(names::REV);
    vcard.add_property(VCardProperty::text(names::REV, now));

    if !vcard.has_property(names::PRODID) {
        vcard.add_property(VCardProperty::text(names::PRODID, PRODID));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hagaki_rfc::vcard::parse::split_structured;

    const FALLBACK: &str = "Unknown Name";

    fn normalize(raw: &str) -> NormalizedCard {
        normalize_card(raw.as_bytes(), &HashSet::new(), FALLBACK).unwrap()
    }

    #[test_log::test]
    fn email_only_card_derives_everything() {
        let card = normalize("BEGIN:VCARD\nVERSION:3.0\nEMAIL:a@b.com\nEND:VCARD\n");

        assert_eq!(card.full_name, "a@b.com");
        assert_eq!(card.vcard.formatted_name(), Some("a@b.com"));
        assert!(!card.uid.is_empty());
        assert!(card.uri.ends_with(".vcf"));

        let serialized = card.carddata();
        assert!(serialized.contains("N:a@b.com;;;;\r\n"));
        assert!(serialized.contains("UID:"));
        assert!(serialized.contains("REV:"));
        assert!(serialized.contains("PRODID:"));
    }

    #[test_log::test]
    fn fn_derived_from_n() {
        let card = normalize("BEGIN:VCARD\nVERSION:3.0\nN:Doe;John;;;\nEND:VCARD\n");
        assert_eq!(card.vcard.formatted_name(), Some("John Doe"));
    }

    #[test_log::test]
    fn placeholder_n_is_ignored_for_fn() {
        let card = normalize(
            "BEGIN:VCARD\nVERSION:3.0\nN:;;;;\nEMAIL:a@b.com\nEND:VCARD\n",
        );
        assert_eq!(card.vcard.formatted_name(), Some("a@b.com"));
    }

    #[test_log::test]
    fn fn_falls_back_to_org_then_unknown() {
        let card = normalize("BEGIN:VCARD\nVERSION:3.0\nORG:Acme Inc.\nEND:VCARD\n");
        assert_eq!(card.vcard.formatted_name(), Some("Acme Inc."));

        let card = normalize("BEGIN:VCARD\nVERSION:3.0\nNOTE:nothing here\nEND:VCARD\n");
        assert_eq!(card.vcard.formatted_name(), Some(FALLBACK));
    }

    #[test_log::test]
    fn n_derived_from_two_token_fn() {
        let card = normalize("BEGIN:VCARD\nVERSION:3.0\nFN:John Doe\nEND:VCARD\n");
        let name = card.vcard.name().unwrap();
        assert_eq!(name.family, vec!["Doe"]);
        assert_eq!(name.given, vec!["John"]);
        assert!(card.carddata().contains("N:Doe;John;;;\r\n"));
    }

    #[test_log::test]
    fn existing_uid_is_kept() {
        let card = normalize("BEGIN:VCARD\nVERSION:3.0\nFN:J\nUID:fixed-uid\nEND:VCARD\n");
        assert_eq!(card.uid, "fixed-uid");
        assert_eq!(card.uri, "fixed-uid.vcf");
    }

    #[test_log::test]
    fn generated_uids_are_unique_per_call() {
        let raw = "BEGIN:VCARD\nVERSION:3.0\nFN:J\nEND:VCARD\n";
        let first = normalize_card(raw.as_bytes(), &HashSet::new(), FALLBACK).unwrap();
        let second = normalize_card(raw.as_bytes(), &HashSet::new(), FALLBACK).unwrap();
        assert_ne!(first.uid, second.uid);
    }

    #[test_log::test]
    fn legacy_card_is_upgraded() {
        let card = normalize(
            "BEGIN:VCARD\nVERSION:2.1\nFN;ENCODING=QUOTED-PRINTABLE:M=C3=BCller\nTEL;HOME;CELL:+1555\nEND:VCARD\n",
        );

        assert_eq!(card.vcard.version, VCardVersion::V3);
        assert_eq!(card.vcard.formatted_name(), Some("Müller"));

        let tel = card.vcard.get_property("TEL").unwrap();
        assert!(tel.has_type("HOME"));
        assert!(tel.has_type("CELL"));
        assert!(tel.get_param("ENCODING").is_none());
        assert!(card.carddata().contains("TEL;TYPE=HOME,CELL:+1555\r\n"));
    }

    #[test_log::test]
    fn markup_is_stripped() {
        let card = normalize(
            "BEGIN:VCARD\nVERSION:3.0\nFN:John <script>alert(1)</script>Doe\nEND:VCARD\n",
        );
        assert_eq!(card.vcard.formatted_name(), Some("John alert(1)Doe"));
    }

    #[test_log::test]
    fn malformed_payload_is_rejected() {
        let err =
            normalize_card(b"BEGIN:VCARD\nVERSION:3.0\nFN:J", &HashSet::new(), FALLBACK)
                .unwrap_err();
        assert!(matches!(err, ServiceError::Malformed(_)));
    }

    #[test_log::test]
    fn trusted_path_only_stamps() {
        let raw = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Client Authored\r\nUID:client-uid\r\nREV:2001-01-01T00:00:00Z\r\nEND:VCARD\r\n";
        let mut vcard = parse_single(raw).unwrap();
        stamp_trusted(&mut vcard);

        // REV untouched, PRODID added, nothing else changed
        let rev = vcard.get_property(names::REV).unwrap();
        assert_eq!(rev.as_text(), Some("2001-01-01T00:00:00Z"));
        assert!(vcard.has_property(names::PRODID));
        assert_eq!(vcard.formatted_name(), Some("Client Authored"));
    }

    #[test_log::test]
    fn split_structured_survives_normalizer_output() {
        // Guard: the serialized N from a derived name parses back
        let card = normalize("BEGIN:VCARD\nVERSION:3.0\nFN:John Doe\nEND:VCARD\n");
        let n_prop = card.vcard.get_property(names::N).unwrap();
        let parts = split_structured(&n_prop.raw_value);
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], "Doe");
    }
}
