//! vCard property values.

use super::structured::{Address, Organization, StructuredName};

/// A vCard property value.
///
/// Compound properties (N, ADR, ORG) carry their structured form; everything
/// else is text. Unrecognized extension properties keep their raw value so
/// they survive a parse/serialize round trip untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VCardValue {
    /// Text value.
    Text(String),

    /// Multi-valued text (comma-separated in source, e.g. CATEGORIES).
    TextList(Vec<String>),

    /// Structured name (N property).
    StructuredName(StructuredName),

    /// Address (ADR property).
    Address(Address),

    /// Organization (ORG property).
    Organization(Organization),

    /// Unknown/extension value (preserved verbatim).
    Unknown(String),
}

impl VCardValue {
    /// Returns the value as text if applicable.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Unknown(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a structured name if applicable.
    #[must_use]
    pub fn as_structured_name(&self) -> Option<&StructuredName> {
        match self {
            Self::StructuredName(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the value as an address if applicable.
    #[must_use]
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the value as an organization if applicable.
    #[must_use]
    pub fn as_organization(&self) -> Option<&Organization> {
        match self {
            Self::Organization(o) => Some(o),
            _ => None,
        }
    }
}

impl From<String> for VCardValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for VCardValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<StructuredName> for VCardValue {
    fn from(n: StructuredName) -> Self {
        Self::StructuredName(n)
    }
}

impl From<Address> for VCardValue {
    fn from(a: Address) -> Self {
        Self::Address(a)
    }
}

impl From<Organization> for VCardValue {
    fn from(o: Organization) -> Self {
        Self::Organization(o)
    }
}
