//! vCard implementation (RFC 2426 / RFC 6350).
//!
//! ## Overview
//!
//! vCard is a standard format for contact information. This implementation
//! reads vCard 2.1, 3.0 (RFC 2426) and 4.0 (RFC 6350) input; output is
//! always 3.0 or newer (legacy cards are upgraded on import).
//!
//! ## Usage
//!
//! ### Parsing
//!
//! ```rust
//! use hagaki_rfc::vcard::parse;
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:3.0\r\n\
//! FN:John Doe\r\n\
//! EMAIL:john@example.com\r\n\
//! END:VCARD\r\n";
//!
//! let card = parse::parse_single(input).unwrap();
//! assert_eq!(card.formatted_name(), Some("John Doe"));
//! ```
//!
//! ### Serializing
//!
//! ```rust
//! use hagaki_rfc::vcard::{VCard, VCardProperty, serialize_single};
//!
//! let mut card = VCard::new();
//! card.add_property(VCardProperty::text("FN", "Jane Doe"));
//!
//! let output = serialize_single(&card);
//! assert!(output.contains("FN:Jane Doe"));
//! ```

pub mod build;
pub mod core;
pub mod parse;

// Re-export commonly used types
pub use build::{serialize, serialize_property, serialize_single};
pub use core::{
    Address, Organization, PropertyKind, StructuredName, VCard, VCardParameter, VCardProperty,
    VCardValue, VCardVersion,
};
pub use parse::{ParseError, ParseResult, parse, parse_single};
