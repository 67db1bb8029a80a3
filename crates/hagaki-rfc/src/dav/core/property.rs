//! DAV property types.

use super::namespace::QName;

/// A property name as requested by a client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyName {
    /// The qualified name.
    pub name: QName,
}

impl PropertyName {
    /// Creates a property name.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self { name }
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name.local_name()
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace_uri(&self) -> &str {
        self.name.namespace_uri()
    }
}

impl From<QName> for PropertyName {
    fn from(name: QName) -> Self {
        Self { name }
    }
}

/// A DAV property value as it appears in a propstat or PROPPATCH body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Empty element.
    Empty,
    /// Plain text content.
    Text(String),
    /// Raw XML content (serialized verbatim into the response).
    Xml(String),
    /// A single `<D:href>` child.
    Href(String),
    /// A `<D:resourcetype>` value: one empty child element per qname.
    ResourceType(Vec<QName>),
}

/// A named DAV property, optionally with a value.
///
/// `value: None` marks a property that was requested but does not exist;
/// these are reported in a 404 propstat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavProperty {
    pub name: QName,
    pub value: Option<PropertyValue>,
}

impl DavProperty {
    /// Creates a property with text content.
    #[must_use]
    pub fn text(name: QName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(PropertyValue::Text(value.into())),
        }
    }

    /// Creates a property with an href child.
    #[must_use]
    pub fn href(name: QName, href: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(PropertyValue::Href(href.into())),
        }
    }

    /// Creates an empty property.
    #[must_use]
    pub fn empty(name: QName) -> Self {
        Self {
            name,
            value: Some(PropertyValue::Empty),
        }
    }

    /// Creates a resourcetype property.
    #[must_use]
    pub fn resource_type(name: QName, types: Vec<QName>) -> Self {
        Self {
            name,
            value: Some(PropertyValue::ResourceType(types)),
        }
    }

    /// Creates a property marker for a name that was not found.
    #[must_use]
    pub fn not_found(name: QName) -> Self {
        Self { name, value: None }
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            Some(PropertyValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_property() {
        let prop = DavProperty::text(QName::dav("displayname"), "Work");
        assert_eq!(prop.as_text(), Some("Work"));
    }

    #[test]
    fn not_found_property_has_no_value() {
        let prop = DavProperty::not_found(QName::dav("quota-used-bytes"));
        assert!(prop.value.is_none());
    }
}
