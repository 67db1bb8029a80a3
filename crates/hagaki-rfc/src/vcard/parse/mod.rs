//! vCard parsing.
//!
//! - Supports vCard 2.1, 3.0 and 4.0 input
//! - Handles line folding/unfolding
//! - Parses property groups (item1.TEL)
//! - Parses structured values (N, ADR, ORG)
//! - Accepts bare vCard 2.1 parameters (`TEL;HOME;CELL:`)

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{ContentLine, parse_content_line, split_lines, unfold_with_space};
pub use parser::{parse, parse_single};
pub use values::{
    decode_quoted_printable, decode_text, parse_address, parse_organization,
    parse_structured_name, split_component, split_structured, unescape_text,
};
