//! DAV request body parsing over quick-xml.

mod error;
mod mkcol;
mod propfind;
mod proppatch;
mod report;

pub use error::{ParseError, ParseResult};
pub use mkcol::parse_mkcol;
pub use propfind::parse_propfind;
pub use proppatch::parse_proppatch;
pub use report::parse_report;

use quick_xml::events::BytesStart;

use crate::dav::core::{Namespace, QName};

/// Collects namespace declarations from an element's attributes into the
/// running prefix table.
pub(crate) fn collect_namespaces(
    e: &BytesStart<'_>,
    namespaces: &mut Vec<(String, String)>,
) -> ParseResult<()> {
    for attr in e.attributes().flatten() {
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = std::str::from_utf8(&attr.value)?;
        if let Some(prefix) = key.strip_prefix("xmlns:") {
            namespaces.push((prefix.to_string(), value.to_string()));
        } else if key == "xmlns" {
            namespaces.push((String::new(), value.to_string()));
        } else {
            // Other attributes ignored
        }
    }
    Ok(())
}

/// Resolves a `QName` from an element, using collected namespace declarations.
///
/// Unprefixed names without a default namespace resolve to `DAV:`.
pub(crate) fn resolve_qname(
    e: &BytesStart<'_>,
    namespaces: &[(String, String)],
) -> ParseResult<QName> {
    let name_bytes = e.name();
    let name = std::str::from_utf8(name_bytes.as_ref())?.to_owned();

    let (prefix, local_name) = if let Some(colon_pos) = name.find(':') {
        (
            name[..colon_pos].to_owned(),
            name[colon_pos + 1..].to_owned(),
        )
    } else {
        (String::new(), name)
    };

    let namespace = namespaces
        .iter()
        .rev()
        .find(|(p, _)| *p == prefix)
        .map_or("DAV:", |(_, ns)| ns.as_str());

    Ok(QName::new(
        Namespace::new(namespace.to_string()),
        local_name,
    ))
}
