//! Extended MKCOL request types (RFC 5689).

/// Initial properties carried by an Extended MKCOL body.
#[derive(Debug, Clone, Default)]
pub struct MkcolRequest {
    /// `{DAV:}displayname`.
    pub displayname: Option<String>,
    /// `{urn:ietf:params:xml:ns:carddav}addressbook-description`.
    pub description: Option<String>,
    /// Whether the body's resourcetype named the addressbook type.
    pub is_addressbook: bool,
}
