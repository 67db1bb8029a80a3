//! Display-oriented structuring of parsed vCards.
//!
//! Converts a parsed card into a nested map of properties and parameters
//! for rendering or API consumption. Nothing here is persisted; the
//! structured form is derived from `carddata` on every read.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use hagaki_rfc::vcard::parse::{split_structured, unescape_text};
use hagaki_rfc::vcard::{PropertyKind, VCard, VCardProperty, serialize_property};

/// Hex length of a property checksum.
const CHECKSUM_LEN: usize = 8;

/// A parameter value: single or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Single(String),
    List(Vec<String>),
}

/// A structured property value.
///
/// `Parts` carries the unescaped `;`-delimited sub-values of compound
/// properties (N, ADR); everything else is plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredValue {
    Text(String),
    Parts(Vec<String>),
}

/// A display-ready property instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredProperty {
    /// Property name (uppercase).
    pub name: String,
    /// The structured value.
    pub value: StructuredValue,
    /// Parameter name to value-or-list.
    pub parameters: BTreeMap<String, ParameterValue>,
    /// Truncated hash of the serialized property, letting UI callers address
    /// this exact instance for in-place edit/delete without a stable id.
    pub checksum: String,
}

/// ## Summary
/// Structures every property of a parsed card, grouped by property name.
///
/// Per-kind behavior:
/// - N and ADR values are split on unescaped `;` into parts.
/// - A BDAY in basic format (`YYYYMMDD`) is reformatted to `YYYY-MM-DD`;
///   one too short to be a date is silently omitted.
/// - A `TYPE=PREF` parameter is rewritten to a synthetic `PREF=1`.
/// - For TEL and EMAIL, multiple TYPE parameters collapse into one ordered
///   list.
#[must_use]
pub fn structure(vcard: &VCard) -> BTreeMap<String, Vec<StructuredProperty>> {
    let mut result: BTreeMap<String, Vec<StructuredProperty>> = BTreeMap::new();

    for prop in &vcard.properties {
        if let Some(structured) = structure_property(prop) {
            result.entry(prop.name.clone()).or_default().push(structured);
        }
    }

    result
}

/// Structures a single property; `None` drops it from the output.
fn structure_property(prop: &VCardProperty) -> Option<StructuredProperty> {
    let kind = prop.kind();

    let value = match kind {
        PropertyKind::Name | PropertyKind::Address => StructuredValue::Parts(
            split_structured(&prop.raw_value)
                .into_iter()
                .map(unescape_text)
                .collect(),
        ),
        PropertyKind::Birthday => StructuredValue::Text(reformat_bday(&prop.raw_value)?),
        PropertyKind::Organization
        | PropertyKind::Categories
        | PropertyKind::FormattedName
        | PropertyKind::Telephone
        | PropertyKind::Email
        | PropertyKind::Uid
        | PropertyKind::Revision
        | PropertyKind::ProductId
        | PropertyKind::Note
        | PropertyKind::Url
        | PropertyKind::Photo
        | PropertyKind::Version => StructuredValue::Text(unescape_text(&prop.raw_value)),
        PropertyKind::Unknown => StructuredValue::Text(prop.raw_value.clone()),
    };

    Some(StructuredProperty {
        name: prop.name.clone(),
        value,
        parameters: structure_parameters(prop, kind),
        checksum: checksum(prop),
    })
}

/// Reformats a dashless BDAY (`YYYYMMDD`) into `YYYY-MM-DD`.
///
/// A value already containing dashes passes through; anything too short to
/// be a date is dropped (returns `None`).
fn reformat_bday(raw: &str) -> Option<String> {
    let value = raw.trim();

    if value.contains('-') {
        return Some(value.to_string());
    }
    if value.len() < 8 {
        return None;
    }

    let (year, rest) = value.split_at(4);
    let (month, day) = rest.split_at(2);
    Some(format!("{year}-{month}-{day}"))
}

fn structure_parameters(
    prop: &VCardProperty,
    kind: PropertyKind,
) -> BTreeMap<String, ParameterValue> {
    let mut parameters: BTreeMap<String, ParameterValue> = BTreeMap::new();
    let mut type_values: Vec<String> = Vec::new();

    for param in &prop.params {
        if param.name == "TYPE" {
            for value in &param.values {
                if value.eq_ignore_ascii_case("PREF") {
                    // UI convenience: preferredness as its own key
                    parameters.insert("PREF".to_string(), ParameterValue::Single("1".to_string()));
                } else {
                    type_values.push(value.clone());
                }
            }
        } else if let Some(value) = param.value() {
            let entry = if param.values.len() > 1 {
                ParameterValue::List(param.values.clone())
            } else {
                ParameterValue::Single(value.to_string())
            };
            parameters.insert(param.name.clone(), entry);
        } else {
            // Bare legacy parameter that escaped the upgrade pass
            type_values.push(param.name.clone());
        }
    }

    if !type_values.is_empty() {
        let entry = if kind.collapses_types() || type_values.len() > 1 {
            ParameterValue::List(type_values)
        } else {
            ParameterValue::Single(type_values.remove(0))
        };
        parameters.insert("TYPE".to_string(), entry);
    }

    parameters
}

/// Truncated SHA-256 of the serialized content line.
fn checksum(prop: &VCardProperty) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serialize_property(prop).as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(CHECKSUM_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use hagaki_rfc::vcard::parse::parse_single;
    use hagaki_rfc::vcard::serialize_single;

    fn card(body: &str) -> VCard {
        let input = format!("BEGIN:VCARD\nVERSION:3.0\n{body}\nEND:VCARD\n");
        parse_single(&input).unwrap()
    }

    #[test]
    fn adr_splits_into_parts() {
        let structured = structure(&card("ADR;TYPE=home:;;123 Main St;Anytown;CA;12345;USA"));
        let adr = &structured["ADR"][0];

        let StructuredValue::Parts(parts) = &adr.value else {
            panic!("expected parts");
        };
        assert_eq!(
            parts,
            &["", "", "123 Main St", "Anytown", "CA", "12345", "USA"]
        );
    }

    #[test]
    fn escaped_semicolon_merges_sub_values() {
        let structured = structure(&card(r"N:Doe\;Smith;John;;;"));
        let n = &structured["N"][0];

        let StructuredValue::Parts(parts) = &n.value else {
            panic!("expected parts");
        };
        assert_eq!(parts[0], "Doe;Smith");
        assert_eq!(parts[1], "John");
    }

    #[test]
    fn bday_basic_format_reformatted() {
        let structured = structure(&card("BDAY:19900615"));
        let bday = &structured["BDAY"][0];
        assert_eq!(bday.value, StructuredValue::Text("1990-06-15".to_string()));
    }

    #[test]
    fn bday_extended_format_passes_through() {
        let structured = structure(&card("BDAY:1990-06-15"));
        let bday = &structured["BDAY"][0];
        assert_eq!(bday.value, StructuredValue::Text("1990-06-15".to_string()));
    }

    #[test]
    fn too_short_bday_is_dropped() {
        let structured = structure(&card("FN:J\nBDAY:1990"));
        assert!(!structured.contains_key("BDAY"));
        assert!(structured.contains_key("FN"));
    }

    #[test]
    fn type_pref_becomes_pref_parameter() {
        let structured = structure(&card("TEL;TYPE=HOME,PREF:+1555"));
        let tel = &structured["TEL"][0];

        assert_eq!(
            tel.parameters.get("PREF"),
            Some(&ParameterValue::Single("1".to_string()))
        );
        assert_eq!(
            tel.parameters.get("TYPE"),
            Some(&ParameterValue::List(vec!["HOME".to_string()]))
        );
    }

    #[test]
    fn multiple_type_params_collapse_for_tel() {
        let structured = structure(&card("TEL;TYPE=HOME;TYPE=CELL:+1555"));
        let tel = &structured["TEL"][0];

        assert_eq!(
            tel.parameters.get("TYPE"),
            Some(&ParameterValue::List(vec![
                "HOME".to_string(),
                "CELL".to_string()
            ]))
        );
    }

    #[test]
    fn adr_single_type_stays_single() {
        let structured = structure(&card("ADR;TYPE=home:;;Street;;;;"));
        let adr = &structured["ADR"][0];
        assert_eq!(
            adr.parameters.get("TYPE"),
            Some(&ParameterValue::Single("home".to_string()))
        );
    }

    #[test]
    fn checksums_address_property_instances() {
        let structured = structure(&card("EMAIL:a@b.com\nEMAIL:c@d.com"));
        let emails = &structured["EMAIL"];

        assert_eq!(emails.len(), 2);
        assert_eq!(emails[0].checksum.len(), CHECKSUM_LEN);
        assert_ne!(emails[0].checksum, emails[1].checksum);
    }

    #[test]
    fn structure_round_trip_preserves_names_and_values() {
        // structure(parse(serialize(x))) must match structure(x) for cards
        // holding only ADR, N, TEL, EMAIL, ORG properties
        let original = card(
            "N:Doe;John;;;\nADR:;;123 Main St;Anytown;CA;12345;USA\nTEL;TYPE=cell:+1555\nEMAIL:a@b.com\nORG:Acme\\; Sons;HQ",
        );

        let reparsed = parse_single(&serialize_single(&original)).unwrap();

        assert_eq!(structure(&original), structure(&reparsed));
    }
}
