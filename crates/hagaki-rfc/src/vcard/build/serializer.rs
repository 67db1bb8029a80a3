//! vCard serialization.

use super::escape::{escape_component, escape_param_value, escape_text};
use super::fold::fold_line;
use crate::vcard::core::{
    Address, Organization, StructuredName, VCard, VCardParameter, VCardProperty, VCardValue,
};

/// Serializes one or more vCards to a string.
///
/// ## Summary
/// Produces RFC 6350 compliant output with proper line folding and escaping.
/// Properties keep their order of appearance, so an unmodified card
/// round-trips byte-identically at the content-line level.
#[must_use]
pub fn serialize(cards: &[VCard]) -> String {
    let mut output = String::new();

    for card in cards {
        serialize_vcard(card, &mut output);
    }

    output
}

/// Serializes a single vCard to a string.
#[must_use]
pub fn serialize_single(card: &VCard) -> String {
    let mut output = String::new();
    serialize_vcard(card, &mut output);
    output
}

fn serialize_vcard(card: &VCard, output: &mut String) {
    output.push_str("BEGIN:VCARD\r\n");

    // VERSION must be first after BEGIN
    output.push_str("VERSION:");
    output.push_str(card.version.as_str());
    output.push_str("\r\n");

    for prop in &card.properties {
        output.push_str(&fold_line(&serialize_property(prop)));
        output.push_str("\r\n");
    }

    output.push_str("END:VCARD\r\n");
}

/// Serializes a single property into an unfolded content line.
///
/// Also used by the structuring layer to compute property checksums, so the
/// output must be deterministic for a given property.
#[must_use]
pub fn serialize_property(prop: &VCardProperty) -> String {
    let mut line = String::new();

    if let Some(ref group) = prop.group {
        line.push_str(group);
        line.push('.');
    }

    line.push_str(&prop.name);

    for param in &prop.params {
        serialize_parameter(param, &mut line);
    }

    line.push(':');
    serialize_value(&prop.value, &mut line);

    line
}

fn serialize_parameter(param: &VCardParameter, output: &mut String) {
    output.push(';');
    output.push_str(&param.name);

    if param.values.is_empty() {
        // Bare vCard 2.1 parameter
        return;
    }

    output.push('=');

    for (i, value) in param.values.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }

        let (escaped, needs_quotes) = escape_param_value(value);

        if needs_quotes {
            output.push('"');
            output.push_str(&escaped);
            output.push('"');
        } else {
            output.push_str(&escaped);
        }
    }
}

fn serialize_value(value: &VCardValue, output: &mut String) {
    match value {
        VCardValue::Text(s) => {
            output.push_str(&escape_text(s));
        }
        VCardValue::TextList(list) => {
            for (i, s) in list.iter().enumerate() {
                if i > 0 {
                    output.push(',');
                }
                output.push_str(&escape_component(s));
            }
        }
        VCardValue::StructuredName(name) => {
            serialize_structured_name(name, output);
        }
        VCardValue::Address(addr) => {
            serialize_address(addr, output);
        }
        VCardValue::Organization(org) => {
            serialize_organization(org, output);
        }
        VCardValue::Unknown(s) => {
            output.push_str(s);
        }
    }
}

fn serialize_structured_name(name: &StructuredName, output: &mut String) {
    // family;given;additional;prefixes;suffixes
    serialize_component_list(&name.family, output);
    output.push(';');
    serialize_component_list(&name.given, output);
    output.push(';');
    serialize_component_list(&name.additional, output);
    output.push(';');
    serialize_component_list(&name.prefixes, output);
    output.push(';');
    serialize_component_list(&name.suffixes, output);
}

fn serialize_address(addr: &Address, output: &mut String) {
    // POBox;Extended;Street;Locality;Region;PostalCode;Country
    serialize_component_list(&addr.po_box, output);
    output.push(';');
    serialize_component_list(&addr.extended, output);
    output.push(';');
    serialize_component_list(&addr.street, output);
    output.push(';');
    serialize_component_list(&addr.locality, output);
    output.push(';');
    serialize_component_list(&addr.region, output);
    output.push(';');
    serialize_component_list(&addr.postal_code, output);
    output.push(';');
    serialize_component_list(&addr.country, output);
}

fn serialize_organization(org: &Organization, output: &mut String) {
    output.push_str(&escape_component(&org.name));
    for unit in &org.units {
        output.push(';');
        output.push_str(&escape_component(unit));
    }
}

fn serialize_component_list(list: &[String], output: &mut String) {
    for (i, s) in list.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        output.push_str(&escape_component(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vcard::core::VCardVersion;
    use crate::vcard::parse::parse_single;

    #[test]
    fn serialize_simple_vcard() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("FN", "John Doe"));

        let output = serialize_single(&card);

        assert!(output.starts_with("BEGIN:VCARD\r\n"));
        assert!(output.contains("VERSION:3.0\r\n"));
        assert!(output.contains("FN:John Doe\r\n"));
        assert!(output.ends_with("END:VCARD\r\n"));
    }

    #[test]
    fn serialize_v4_vcard() {
        let card = VCard::with_version(VCardVersion::V4);
        let output = serialize_single(&card);
        assert!(output.contains("VERSION:4.0\r\n"));
    }

    #[test]
    fn serialize_with_parameters() {
        let mut card = VCard::new();
        let mut prop = VCardProperty::text("TEL", "+1-555-555-5555");
        prop.add_type("home");
        prop.add_type("voice");
        prop.add_param(VCardParameter::pref(1));
        card.add_property(prop);

        let output = serialize_single(&card);
        assert!(output.contains("TEL;TYPE=home,voice;PREF=1:+1-555-555-5555\r\n"));
    }

    #[test]
    fn serialize_escapes_text() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text(
            "NOTE",
            "Line1\nLine2; with special, chars",
        ));

        let output = serialize_single(&card);
        assert!(output.contains("NOTE:Line1\\nLine2\\; with special\\, chars\r\n"));
    }

    #[test]
    fn serialize_structured_name() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;John;;;\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        let output = serialize_single(&card);
        assert!(output.contains("N:Doe;John;;;\r\n"));
    }

    #[test]
    fn escaped_semicolon_round_trip() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe\\;Smith;John;;;\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        let name = card.name().unwrap();
        assert_eq!(name.family, vec!["Doe;Smith"]);

        let output = serialize_single(&card);
        assert!(output.contains("N:Doe\\;Smith;John;;;\r\n"));
    }

    #[test]
    fn serialize_folds_long_lines() {
        let mut card = VCard::new();
        let long_value = "X".repeat(100);
        card.add_property(VCardProperty::text("NOTE", &long_value));

        let output = serialize_single(&card);
        assert!(output.contains("\r\n "));
    }

    #[test]
    fn parse_serialize_round_trip() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John Doe\r\nN:Doe;John;;;\r\nADR;TYPE=home:;;123 Main St;Anytown;CA;12345;USA\r\nTEL;TYPE=cell:+1555\r\nEMAIL:john@example.com\r\nORG:Acme Inc.;Engineering\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        let output = serialize_single(&card);
        assert_eq!(output, input);
    }
}
