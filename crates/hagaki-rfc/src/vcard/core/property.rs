//! vCard property types.

use super::parameter::VCardParameter;
use super::value::VCardValue;

/// A vCard property.
///
/// Contains the parsed value along with the original raw value
/// for round-trip fidelity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCardProperty {
    /// Optional property group (e.g., "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<VCardParameter>,
    /// Parsed value.
    pub value: VCardValue,
    /// Original raw value string (for round-trip).
    pub raw_value: String,
}

impl VCardProperty {
    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value_str = value.into();
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: VCardValue::Text(value_str.clone()),
            raw_value: value_str,
        }
    }

    /// Returns the typed kind of this property.
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        PropertyKind::from_name(&self.name)
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&VCardParameter> {
        let name_upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == name_upper)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        let p = self.get_param(name)?;
        p.value()
    }

    /// Returns whether this property has the specified TYPE value.
    #[must_use]
    pub fn has_type(&self, type_value: &str) -> bool {
        self.get_param("TYPE")
            .is_some_and(|p| p.has_value(type_value))
    }

    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Adds a parameter to this property.
    pub fn add_param(&mut self, param: VCardParameter) {
        self.params.push(param);
    }

    /// Adds a TYPE parameter value, merging into an existing TYPE parameter.
    pub fn add_type(&mut self, type_value: impl Into<String>) {
        if let Some(param) = self.params.iter_mut().find(|p| p.name == "TYPE") {
            param.values.push(type_value.into());
        } else {
            self.params.push(VCardParameter::type_param(type_value));
        }
    }

    /// Removes all parameters with the given name.
    pub fn remove_param(&mut self, name: &str) {
        let name_upper = name.to_ascii_uppercase();
        self.params.retain(|p| p.name != name_upper);
    }
}

/// The set of property names the normalization and structuring logic knows
/// about, as a closed enum so matches over it are checked exhaustively.
/// Everything else falls into [`PropertyKind::Unknown`] and is passed through
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// FN
    FormattedName,
    /// N
    Name,
    /// ADR
    Address,
    /// TEL
    Telephone,
    /// EMAIL
    Email,
    /// ORG
    Organization,
    /// BDAY
    Birthday,
    /// UID
    Uid,
    /// REV
    Revision,
    /// PRODID
    ProductId,
    /// CATEGORIES
    Categories,
    /// NOTE
    Note,
    /// URL
    Url,
    /// PHOTO
    Photo,
    /// VERSION
    Version,
    /// Extension or unrecognized property.
    Unknown,
}

impl PropertyKind {
    /// Classifies a property name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "FN" => Self::FormattedName,
            "N" => Self::Name,
            "ADR" => Self::Address,
            "TEL" => Self::Telephone,
            "EMAIL" => Self::Email,
            "ORG" => Self::Organization,
            "BDAY" => Self::Birthday,
            "UID" => Self::Uid,
            "REV" => Self::Revision,
            "PRODID" => Self::ProductId,
            "CATEGORIES" => Self::Categories,
            "NOTE" => Self::Note,
            "URL" => Self::Url,
            "PHOTO" => Self::Photo,
            "VERSION" => Self::Version,
            _ => Self::Unknown,
        }
    }

    /// Returns whether the property value is `;`-structured (N, ADR, ORG).
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Name | Self::Address | Self::Organization)
    }

    /// Returns whether multiple TYPE parameters should collapse into one
    /// ordered list for this property (TEL, EMAIL).
    #[must_use]
    pub const fn collapses_types(self) -> bool {
        matches!(self, Self::Telephone | Self::Email)
    }
}

/// Common property names as constants.
pub mod names {
    pub const FN: &str = "FN";
    pub const N: &str = "N";
    pub const ADR: &str = "ADR";
    pub const TEL: &str = "TEL";
    pub const EMAIL: &str = "EMAIL";
    pub const ORG: &str = "ORG";
    pub const BDAY: &str = "BDAY";
    pub const UID: &str = "UID";
    pub const REV: &str = "REV";
    pub const PRODID: &str = "PRODID";
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const NOTE: &str = "NOTE";
    pub const URL: &str = "URL";
    pub const PHOTO: &str = "PHOTO";
    pub const VERSION: &str = "VERSION";
    pub const BEGIN: &str = "BEGIN";
    pub const END: &str = "END";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_text() {
        let prop = VCardProperty::text("fn", "John Doe");
        assert_eq!(prop.name, "FN");
        assert_eq!(prop.as_text(), Some("John Doe"));
        assert_eq!(prop.kind(), PropertyKind::FormattedName);
    }

    #[test]
    fn property_with_types() {
        let mut prop = VCardProperty::text("TEL", "+1-555-555-5555");
        prop.add_type("home");
        prop.add_type("voice");

        assert!(prop.has_type("home"));
        assert!(prop.has_type("VOICE"));
        assert_eq!(prop.params.len(), 1);
    }

    #[test]
    fn kind_classification() {
        assert_eq!(PropertyKind::from_name("adr"), PropertyKind::Address);
        assert_eq!(PropertyKind::from_name("X-SKYPE"), PropertyKind::Unknown);
        assert!(PropertyKind::Name.is_structured());
        assert!(PropertyKind::Email.collapses_types());
        assert!(!PropertyKind::Address.collapses_types());
    }
}
