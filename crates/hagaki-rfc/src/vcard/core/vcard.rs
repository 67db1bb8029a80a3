//! vCard wrapper type.

use super::property::{PropertyKind, VCardProperty};
use super::structured::{Organization, StructuredName};

/// vCard version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VCardVersion {
    /// vCard 2.1 (pre-standard). Accepted on input only; the normalizer
    /// upgrades these cards before they are stored.
    V21,
    /// vCard 3.0 (RFC 2426).
    #[default]
    V3,
    /// vCard 4.0 (RFC 6350).
    V4,
}

impl VCardVersion {
    /// Parses from version string.
    #[must_use]
    #[expect(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "2.1" => Some(Self::V21),
            "3.0" => Some(Self::V3),
            "4.0" => Some(Self::V4),
            _ => None,
        }
    }

    /// Returns the version string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V21 => "2.1",
            Self::V3 => "3.0",
            Self::V4 => "4.0",
        }
    }

    /// Returns whether this version predates vCard 3.0.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::V21)
    }
}

impl core::str::FromStr for VCardVersion {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VCardVersion::from_str(s).ok_or(())
    }
}

/// A complete vCard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VCard {
    /// vCard version.
    pub version: VCardVersion,
    /// All properties in order of appearance.
    pub properties: Vec<VCardProperty>,
}

impl VCard {
    /// Creates a new vCard 3.0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: VCardVersion::V3,
            properties: Vec::new(),
        }
    }

    /// Creates a vCard with the specified version.
    #[must_use]
    pub fn with_version(version: VCardVersion) -> Self {
        Self {
            version,
            properties: Vec::new(),
        }
    }

    /// Adds a property to the vCard.
    pub fn add_property(&mut self, prop: VCardProperty) {
        self.properties.push(prop);
    }

    /// Removes all properties with the given name.
    pub fn remove_properties(&mut self, name: &str) {
        let name_upper = name.to_ascii_uppercase();
        self.properties.retain(|p| p.name != name_upper);
    }

    /// Returns all properties with the given name.
    #[must_use]
    pub fn get_properties(&self, name: &str) -> Vec<&VCardProperty> {
        let name_upper = name.to_ascii_uppercase();
        self.properties
            .iter()
            .filter(|p| p.name == name_upper)
            .collect()
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&VCardProperty> {
        let name_upper = name.to_ascii_uppercase();
        self.properties.iter().find(|p| p.name == name_upper)
    }

    /// Returns whether a property with the given name exists.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    /// Returns the FN (formatted name) value.
    #[must_use]
    pub fn formatted_name(&self) -> Option<&str> {
        self.get_property("FN")?.as_text()
    }

    /// Returns the N (structured name) value.
    #[must_use]
    pub fn name(&self) -> Option<&StructuredName> {
        self.get_property("N")?.value.as_structured_name()
    }

    /// Returns the UID value.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.get_property("UID")?.as_text()
    }

    /// Returns all EMAIL property values.
    #[must_use]
    pub fn emails(&self) -> Vec<&str> {
        self.get_properties("EMAIL")
            .iter()
            .filter_map(|p| p.as_text())
            .collect()
    }

    /// Returns the ORG (organization) value.
    #[must_use]
    pub fn organization(&self) -> Option<&Organization> {
        self.get_property("ORG")?.value.as_organization()
    }

    /// Iterates properties of the given typed kind.
    pub fn properties_of_kind(&self, kind: PropertyKind) -> impl Iterator<Item = &VCardProperty> {
        self.properties.iter().filter(move |p| p.kind() == kind)
    }
}

impl Default for VCard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcard_new() {
        let card = VCard::new();
        assert_eq!(card.version, VCardVersion::V3);
        assert!(card.properties.is_empty());
    }

    #[test]
    fn vcard_version_parse() {
        assert_eq!(VCardVersion::from_str("2.1"), Some(VCardVersion::V21));
        assert_eq!(VCardVersion::from_str("3.0"), Some(VCardVersion::V3));
        assert_eq!(VCardVersion::from_str("4.0"), Some(VCardVersion::V4));
        assert_eq!(VCardVersion::from_str("1.0"), None);
    }

    #[test]
    fn legacy_version_ordering() {
        assert!(VCardVersion::V21.is_legacy());
        assert!(VCardVersion::V21 < VCardVersion::V3);
        assert!(VCardVersion::V3 < VCardVersion::V4);
    }

    #[test]
    fn vcard_formatted_name() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("FN", "John Doe"));
        assert_eq!(card.formatted_name(), Some("John Doe"));
    }

    #[test]
    fn vcard_emails() {
        let mut card = VCard::new();
        card.add_property(VCardProperty::text("EMAIL", "john@example.com"));
        card.add_property(VCardProperty::text("EMAIL", "john.doe@work.com"));

        let emails = card.emails();
        assert_eq!(emails.len(), 2);
        assert!(emails.contains(&"john@example.com"));
    }
}
