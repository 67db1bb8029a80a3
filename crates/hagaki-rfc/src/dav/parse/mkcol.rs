//! Extended MKCOL request XML parsing (RFC 5689).

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::{collect_namespaces, resolve_qname};
use crate::dav::core::{CARDDAV_NS, MkcolRequest};

/// Parses an Extended MKCOL request body.
///
/// Reads the initial `displayname` and `addressbook-description` property
/// values and whether the resourcetype names an addressbook.
///
/// ## Errors
/// Returns an error if the XML is malformed.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_mkcol(xml: &[u8]) -> ParseResult<MkcolRequest> {
    if xml.is_empty() {
        return Ok(MkcolRequest::default());
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut namespaces: Vec<(String, String)> = Vec::new();
    let mut request = MkcolRequest::default();
    let mut in_resourcetype = false;
    let mut current_text_target: Option<TextTarget> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?.to_owned();

                collect_namespaces(e, &mut namespaces)?;

                // Empty elements emit no End event, so the capture target
                // must reset on every element
                current_text_target = None;

                match local_name.as_str() {
                    "resourcetype" => in_resourcetype = true,
                    "addressbook" if in_resourcetype => {
                        let qname = resolve_qname(e, &namespaces)?;
                        if qname.namespace_uri() == CARDDAV_NS {
                            request.is_addressbook = true;
                        }
                    }
                    "displayname" => {
                        current_text_target = Some(TextTarget::DisplayName);
                    }
                    "addressbook-description" => {
                        current_text_target = Some(TextTarget::Description);
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(target) = current_text_target {
                    let decoded = reader.decoder().decode(e.as_ref())?.to_string();
                    match target {
                        TextTarget::DisplayName => request.displayname = Some(decoded),
                        TextTarget::Description => request.description = Some(decoded),
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name_bytes = e.local_name();
                match std::str::from_utf8(local_name_bytes.as_ref())? {
                    "resourcetype" => in_resourcetype = false,
                    "displayname" | "addressbook-description" => current_text_target = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(request)
}

#[derive(Clone, Copy)]
enum TextTarget {
    DisplayName,
    Description,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_body() {
        let req = parse_mkcol(b"").unwrap();
        assert!(req.displayname.is_none());
        assert!(!req.is_addressbook);
    }

    #[test]
    fn parse_extended_mkcol() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:mkcol xmlns:D="DAV:" xmlns:CR="urn:ietf:params:xml:ns:carddav">
  <D:set>
    <D:prop>
      <D:resourcetype>
        <D:collection/>
        <CR:addressbook/>
      </D:resourcetype>
      <D:displayname>Work</D:displayname>
      <CR:addressbook-description>Office contacts</CR:addressbook-description>
    </D:prop>
  </D:set>
</D:mkcol>"#;

        let req = parse_mkcol(xml).unwrap();
        assert!(req.is_addressbook);
        assert_eq!(req.displayname.as_deref(), Some("Work"));
        assert_eq!(req.description.as_deref(), Some("Office contacts"));
    }
}
