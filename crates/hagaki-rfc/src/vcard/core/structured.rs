//! Structured (compound) vCard value types.

/// Structured name (N property): five `;`-delimited components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StructuredName {
    pub family: Vec<String>,
    pub given: Vec<String>,
    pub additional: Vec<String>,
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl StructuredName {
    /// Creates a name with family and given components.
    #[must_use]
    pub fn simple(family: impl Into<String>, given: impl Into<String>) -> Self {
        Self {
            family: vec![family.into()],
            given: vec![given.into()],
            ..Self::default()
        }
    }

    /// Returns whether every component is empty (the `;;;;` placeholder).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        fn blank(parts: &[String]) -> bool {
            parts.iter().all(|p| p.trim().is_empty())
        }
        blank(&self.family)
            && blank(&self.given)
            && blank(&self.additional)
            && blank(&self.prefixes)
            && blank(&self.suffixes)
    }

    /// Returns a display name derived from the components (given first).
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.prefixes.iter().map(String::as_str));
        parts.extend(self.given.iter().map(String::as_str));
        parts.extend(self.additional.iter().map(String::as_str));
        parts.extend(self.family.iter().map(String::as_str));
        parts.extend(self.suffixes.iter().map(String::as_str));

        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Address (ADR property): seven `;`-delimited components.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address {
    pub po_box: Vec<String>,
    pub extended: Vec<String>,
    pub street: Vec<String>,
    pub locality: Vec<String>,
    pub region: Vec<String>,
    pub postal_code: Vec<String>,
    pub country: Vec<String>,
}

/// Organization (ORG property): name plus organizational units.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Organization {
    pub name: String,
    pub units: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_placeholder() {
        let name = StructuredName::default();
        assert!(name.is_empty());

        let name = StructuredName::simple("Doe", "John");
        assert!(!name.is_empty());
    }

    #[test]
    fn display_order_given_first() {
        let name = StructuredName::simple("Doe", "John");
        assert_eq!(name.display(), "John Doe");
    }
}
