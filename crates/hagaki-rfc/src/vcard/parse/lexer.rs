//! vCard lexer for line unfolding and content line parsing.
//!
//! vCard uses the same folding/unfolding rules as iCalendar (RFC 5545 §3.1).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::vcard::core::VCardParameter;

/// Unfolds lines while preserving a single space at fold boundaries.
#[must_use]
pub fn unfold_with_space(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
                if matches!(chars.peek(), Some(' ' | '\t')) {
                    chars.next();
                    result.push(' ');
                } else {
                    result.push('\n');
                }
            } else {
                result.push(c);
            }
        } else if c == '\n' {
            // Bare LF (lenient)
            if matches!(chars.peek(), Some(' ' | '\t')) {
                chars.next();
                result.push(' ');
            } else {
                result.push('\n');
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Splits unfolded input into logical lines, dropping empty ones.
#[must_use]
pub fn split_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(ToString::to_string)
        .collect()
}

/// A parsed content line before value interpretation.
#[derive(Debug, Clone)]
pub struct ContentLine {
    /// Property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (uppercase).
    pub name: String,
    /// Parameters.
    pub params: Vec<VCardParameter>,
    /// Raw value string.
    pub value: String,
}

/// Parses a single content line into its components.
///
/// Format: `[group.]name[;param[=value]]*:value`
///
/// ## Errors
/// Returns an error if the line is malformed or missing the colon separator.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    // Find the colon separating name/params from value
    let colon_pos = find_value_separator(line).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            "missing colon separator",
        )
    })?;

    let (name_params, value) = line.split_at(colon_pos);
    let value = &value[1..]; // Skip the colon

    // Parse group and name
    let (group, name_params) = parse_group(name_params);

    // Split name from parameters
    let (name, params_str) = if let Some(semi_pos) = name_params.find(';') {
        (&name_params[..semi_pos], Some(&name_params[semi_pos + 1..]))
    } else {
        (name_params, None)
    };

    // Validate property name
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            format!("invalid property name: {name}"),
        ));
    }

    let params = if let Some(params_str) = params_str {
        parse_parameters(params_str)
    } else {
        Vec::new()
    };

    Ok(ContentLine {
        group: group.map(String::from),
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Finds the colon that separates name/params from value.
///
/// Must handle quoted parameter values that may contain colons.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }

    None
}

/// Parses optional group prefix.
fn parse_group(s: &str) -> (Option<&str>, &str) {
    if let Some(dot_pos) = s.find('.') {
        let potential_group = &s[..dot_pos];
        // Group must be alphanumeric + hyphen
        if !potential_group.is_empty()
            && potential_group
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return (Some(potential_group), &s[dot_pos + 1..]);
        }
    }
    (None, s)
}

/// Parses the parameter section of a content line.
///
/// Parameters are `;`-separated. A segment without `=` is a bare vCard 2.1
/// parameter (`TEL;HOME;CELL:`) and is kept as a valueless parameter for the
/// upgrade pass to rewrite.
fn parse_parameters(s: &str) -> Vec<VCardParameter> {
    let mut params = Vec::new();

    for segment in split_param_segments(s) {
        if segment.is_empty() {
            continue;
        }

        if let Some(eq_pos) = segment.find('=') {
            let name = &segment[..eq_pos];
            let values = parse_param_values(&segment[eq_pos + 1..]);
            params.push(VCardParameter::multi(name, values));
        } else {
            params.push(VCardParameter::bare(segment));
        }
    }

    params
}

/// Splits the parameter section on unquoted semicolons.
fn split_param_segments(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    segments.push(&s[start..]);
    segments
}

/// Parses parameter values (comma-separated, possibly quoted, with RFC 6868
/// caret decoding).
fn parse_param_values(s: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(std::mem::take(&mut current));
            }
            '^' if !in_quotes => match chars.peek() {
                Some('n') => {
                    chars.next();
                    current.push('\n');
                }
                Some('\'') => {
                    chars.next();
                    current.push('"');
                }
                Some('^') => {
                    chars.next();
                    current.push('^');
                }
                _ => current.push('^'),
            },
            _ => current.push(c),
        }
    }

    values.push(current);
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfold_crlf() {
        let input = "FN:John\r\n Doe";
        assert_eq!(unfold_with_space(input), "FN:John Doe");
    }

    #[test]
    fn unfold_bare_lf() {
        let input = "FN:John\n Doe";
        assert_eq!(unfold_with_space(input), "FN:John Doe");
    }

    #[test]
    fn split_lines_filters_empty() {
        let input = "LINE1\n\nLINE2\n";
        assert_eq!(split_lines(input), vec!["LINE1", "LINE2"]);
    }

    #[test]
    fn parse_simple_line() {
        let line = parse_content_line("FN:John Doe", 1).unwrap();
        assert!(line.group.is_none());
        assert_eq!(line.name, "FN");
        assert!(line.params.is_empty());
        assert_eq!(line.value, "John Doe");
    }

    #[test]
    fn parse_grouped_line() {
        let line = parse_content_line("item1.TEL:+1-555-555-5555", 1).unwrap();
        assert_eq!(line.group, Some("item1".to_string()));
        assert_eq!(line.name, "TEL");
    }

    #[test]
    fn parse_with_parameters() {
        let line = parse_content_line("TEL;TYPE=home,voice;PREF=1:+1-555-555-5555", 1).unwrap();
        assert_eq!(line.name, "TEL");
        assert_eq!(line.params.len(), 2);

        let type_param = &line.params[0];
        assert_eq!(type_param.name, "TYPE");
        assert_eq!(type_param.values, vec!["home", "voice"]);

        let pref_param = &line.params[1];
        assert_eq!(pref_param.name, "PREF");
        assert_eq!(pref_param.value(), Some("1"));
    }

    #[test]
    fn parse_bare_legacy_parameters() {
        let line = parse_content_line("TEL;HOME;CELL:+1-555-555-5555", 1).unwrap();
        assert_eq!(line.params.len(), 2);
        assert_eq!(line.params[0].name, "HOME");
        assert!(line.params[0].is_bare());
        assert_eq!(line.params[1].name, "CELL");
    }

    #[test]
    fn parse_quoted_param() {
        let line =
            parse_content_line("ADR;LABEL=\"123 Main St; Anytown\":;;123 Main St", 1).unwrap();
        assert_eq!(line.params.len(), 1);
        assert_eq!(line.params[0].value(), Some("123 Main St; Anytown"));
    }

    #[test]
    fn parse_colon_in_value() {
        let line = parse_content_line("URL:https://example.com:8080/path", 1).unwrap();
        assert_eq!(line.value, "https://example.com:8080/path");
    }

    #[test]
    fn missing_colon_is_error() {
        assert!(parse_content_line("FN John Doe", 3).is_err());
    }
}
