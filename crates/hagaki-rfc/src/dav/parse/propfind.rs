//! PROPFIND request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::{collect_namespaces, resolve_qname};
use crate::dav::core::{PropertyName, PropfindRequest, PropfindType};

/// Parses a PROPFIND request body.
///
/// ## Summary
/// An empty body (and a body naming neither allprop, propname nor prop)
/// means allprop, per RFC 4918 §9.1.
///
/// ## Errors
/// Returns an error if the XML is malformed.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_propfind(xml: &[u8]) -> ParseResult<PropfindRequest> {
    if xml.is_empty() {
        return Ok(PropfindRequest::allprop());
    }

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut namespaces: Vec<(String, String)> = Vec::new();
    let mut in_propfind = false;
    let mut in_prop = false;
    let mut propfind_type: Option<PropfindType> = None;
    let mut properties: Vec<PropertyName> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?.to_owned();

                collect_namespaces(e, &mut namespaces)?;

                match local_name.as_str() {
                    "propfind" => {
                        in_propfind = true;
                    }
                    "allprop" if in_propfind => {
                        propfind_type = Some(PropfindType::AllProp);
                    }
                    "propname" if in_propfind => {
                        propfind_type = Some(PropfindType::PropName);
                    }
                    "prop" if in_propfind => {
                        in_prop = true;
                        if propfind_type.is_none() {
                            propfind_type = Some(PropfindType::Prop(Vec::new()));
                        }
                    }
                    _ if in_prop => {
                        let qname = resolve_qname(e, &namespaces)?;
                        properties.push(PropertyName::new(qname));
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name_bytes = e.local_name();
                match std::str::from_utf8(local_name_bytes.as_ref())? {
                    "propfind" => in_propfind = false,
                    "prop" => in_prop = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let request = match propfind_type {
        Some(PropfindType::AllProp) | None => PropfindRequest::allprop(),
        Some(PropfindType::PropName) => PropfindRequest::propname(),
        Some(PropfindType::Prop(_)) => PropfindRequest::prop(properties),
    };

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_body() {
        let req = parse_propfind(b"").unwrap();
        assert!(req.is_allprop());
    }

    #[test]
    fn parse_allprop() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:">
  <D:allprop/>
</D:propfind>"#;

        let req = parse_propfind(xml).unwrap();
        assert!(req.is_allprop());
    }

    #[test]
    fn parse_prop() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:CR="urn:ietf:params:xml:ns:carddav" xmlns:CS="http://calendarserver.org/ns/">
  <D:prop>
    <D:displayname/>
    <CR:addressbook-description/>
    <CS:getctag/>
  </D:prop>
</D:propfind>"#;

        let req = parse_propfind(xml).unwrap();
        let props = req.requested_properties().unwrap();
        assert_eq!(props.len(), 3);
        assert_eq!(props[0].local_name(), "displayname");
        assert_eq!(props[1].local_name(), "addressbook-description");
        assert_eq!(
            props[1].namespace_uri(),
            "urn:ietf:params:xml:ns:carddav"
        );
        assert_eq!(props[2].local_name(), "getctag");
        assert_eq!(props[2].namespace_uri(), "http://calendarserver.org/ns/");
    }
}
