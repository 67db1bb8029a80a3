//! vCard document parser.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{ContentLine, parse_content_line, split_lines, unfold_with_space};
use super::values::{parse_address, parse_organization, parse_structured_name, unescape_text};
use crate::vcard::core::{PropertyKind, VCard, VCardProperty, VCardValue, VCardVersion};

/// Parses a vCard document into one or more vCards.
///
/// ## Errors
/// Returns a parse error if the document is malformed.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<Vec<VCard>> {
    let unfolded = unfold_with_space(input);
    let lines = split_lines(&unfolded);

    let mut parser = Parser::new(lines);
    let cards = parser.parse_document()?;

    tracing::debug!(count = cards.len(), "Parsed vCards");

    Ok(cards)
}

/// Parses a single vCard from input.
///
/// ## Errors
/// Returns an error if the document contains no vCards or is malformed.
pub fn parse_single(input: &str) -> ParseResult<VCard> {
    let cards = parse(input)?;
    cards.into_iter().next().ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::UnexpectedEof,
            1,
            "no vCard found in document",
        )
    })
}

struct Parser {
    lines: Vec<String>,
    pos: usize,
}

impl Parser {
    fn new(lines: Vec<String>) -> Self {
        Self { lines, pos: 0 }
    }

    fn current_line(&self) -> usize {
        self.pos + 1
    }

    fn parse_document(&mut self) -> ParseResult<Vec<VCard>> {
        let mut cards = Vec::new();

        while self.pos < self.lines.len() {
            let line = &self.lines[self.pos];

            if line.eq_ignore_ascii_case("BEGIN:VCARD") {
                self.pos += 1;
                cards.push(self.parse_vcard()?);
            } else {
                // Skip unknown content at top level
                self.pos += 1;
            }
        }

        Ok(cards)
    }

    fn parse_vcard(&mut self) -> ParseResult<VCard> {
        let mut version = VCardVersion::V3;
        let mut properties = Vec::new();
        let start_line = self.current_line();

        while self.pos < self.lines.len() {
            let line = self.lines[self.pos].clone();
            let line_num = self.current_line();
            self.pos += 1;

            if line.eq_ignore_ascii_case("END:VCARD") {
                return Ok(VCard {
                    version,
                    properties,
                });
            }

            let content_line = parse_content_line(&line, line_num)?;

            if content_line.name == "VERSION" {
                version = VCardVersion::from_str(&content_line.value).ok_or_else(|| {
                    ParseError::new(
                        ParseErrorKind::UnsupportedVersion,
                        line_num,
                        format!("unsupported vCard version: {}", content_line.value),
                    )
                })?;
            } else {
                properties.push(convert_to_property(content_line));
            }
        }

        Err(ParseError::new(
            ParseErrorKind::UnexpectedEof,
            start_line,
            "vCard not closed with END:VCARD",
        ))
    }
}

/// Interprets a content line's value according to its property kind.
fn convert_to_property(line: ContentLine) -> VCardProperty {
    let kind = PropertyKind::from_name(&line.name);
    let raw_value = line.value;

    let value = match kind {
        PropertyKind::Name => VCardValue::StructuredName(parse_structured_name(&raw_value)),
        PropertyKind::Address => VCardValue::Address(parse_address(&raw_value)),
        PropertyKind::Organization => VCardValue::Organization(parse_organization(&raw_value)),
        PropertyKind::Categories => {
            VCardValue::TextList(super::values::split_component(&raw_value))
        }
        PropertyKind::FormattedName
        | PropertyKind::Telephone
        | PropertyKind::Email
        | PropertyKind::Birthday
        | PropertyKind::Uid
        | PropertyKind::Revision
        | PropertyKind::ProductId
        | PropertyKind::Note
        | PropertyKind::Url
        | PropertyKind::Photo
        | PropertyKind::Version => VCardValue::Text(unescape_text(&raw_value)),
        PropertyKind::Unknown => VCardValue::Unknown(raw_value.clone()),
    };

    VCardProperty {
        group: line.group,
        name: line.name,
        params: line.params,
        value,
        raw_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John Doe\r\nEMAIL:john@example.com\r\nEND:VCARD\r\n";

    #[test_log::test]
    fn parse_simple_card() {
        let card = parse_single(SIMPLE).unwrap();
        assert_eq!(card.version, VCardVersion::V3);
        assert_eq!(card.formatted_name(), Some("John Doe"));
        assert_eq!(card.emails(), vec!["john@example.com"]);
    }

    #[test_log::test]
    fn parse_structured_n() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;John;;;\r\nFN:John Doe\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        let name = card.name().unwrap();
        assert_eq!(name.family, vec!["Doe"]);
        assert_eq!(name.given, vec!["John"]);
    }

    #[test_log::test]
    fn parse_folded_property() {
        let input =
            "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John\r\n  Doe\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        assert_eq!(card.formatted_name(), Some("John  Doe"));
    }

    #[test_log::test]
    fn parse_legacy_v21() {
        let input = "BEGIN:VCARD\r\nVERSION:2.1\r\nFN:John Doe\r\nTEL;HOME;CELL:+1555\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        assert_eq!(card.version, VCardVersion::V21);
        let tel = card.get_property("TEL").unwrap();
        assert_eq!(tel.params.len(), 2);
        assert!(tel.params[0].is_bare());
    }

    #[test_log::test]
    fn parse_multiple_cards() {
        let input = format!("{SIMPLE}{SIMPLE}");
        let cards = parse(&input).unwrap();
        assert_eq!(cards.len(), 2);
    }

    #[test_log::test]
    fn unknown_property_preserved_verbatim() {
        let input =
            "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:J\r\nX-SKYPE:john.doe\r\nEND:VCARD\r\n";
        let card = parse_single(input).unwrap();
        let prop = card.get_property("X-SKYPE").unwrap();
        assert_eq!(prop.value, VCardValue::Unknown("john.doe".to_string()));
    }

    #[test_log::test]
    fn unterminated_card_is_error() {
        let input = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John Doe\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedEof);
    }

    #[test_log::test]
    fn unsupported_version_is_error() {
        let input = "BEGIN:VCARD\r\nVERSION:5.0\r\nEND:VCARD\r\n";
        let err = parse(input).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnsupportedVersion);
    }
}
