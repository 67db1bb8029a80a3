//! PROPPATCH request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::{collect_namespaces, resolve_qname};
use crate::dav::core::{DavProperty, PropertyValue, ProppatchRequest, QName, SetOrRemove};

/// Parses a PROPPATCH request body (RFC 4918 §9.2).
///
/// Property content is captured as text where possible and as raw XML when
/// the property value contains child elements.
///
/// ## Errors
/// Returns an error if the XML is malformed.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
#[expect(clippy::too_many_lines)]
pub fn parse_proppatch(xml: &[u8]) -> ParseResult<ProppatchRequest> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut namespaces: Vec<(String, String)> = Vec::new();

    let mut request = ProppatchRequest::new();
    let mut current_operation: Option<SetOrRemove> = None;
    let mut in_prop = false;
    let mut current_prop_name: Option<QName> = None;
    let mut property_depth = 0usize;
    let mut property_content = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?.to_owned();

                collect_namespaces(e, &mut namespaces)?;

                match local_name.as_str() {
                    "set" => current_operation = Some(SetOrRemove::Set),
                    "remove" => current_operation = Some(SetOrRemove::Remove),
                    "prop" if current_operation.is_some() => in_prop = true,
                    _ if in_prop => {
                        if current_prop_name.is_none() {
                            current_prop_name = Some(resolve_qname(e, &namespaces)?);
                            property_depth = 1;
                            property_content.clear();
                        } else {
                            // Nested element within property, captured as raw XML
                            property_depth += 1;
                            let name_bytes = e.name();
                            let name = std::str::from_utf8(name_bytes.as_ref())?;
                            property_content.push('<');
                            property_content.push_str(name);
                            property_content.push('>');
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                collect_namespaces(e, &mut namespaces)?;

                if in_prop {
                    if current_prop_name.is_none() {
                        // Empty property element (remove target or empty set)
                        let qname = resolve_qname(e, &namespaces)?;

                        match current_operation {
                            Some(SetOrRemove::Set) => {
                                request.set(DavProperty::empty(qname));
                            }
                            Some(SetOrRemove::Remove) => {
                                request.remove(qname);
                            }
                            None => {}
                        }
                    } else {
                        let name_bytes = e.name();
                        let name = std::str::from_utf8(name_bytes.as_ref())?;
                        property_content.push('<');
                        property_content.push_str(name);
                        property_content.push_str("/>");
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if current_prop_name.is_some() {
                    let decoded = reader.decoder().decode(e.as_ref())?;
                    property_content.push_str(&decoded);
                }
            }
            Ok(Event::CData(ref e)) => {
                if current_prop_name.is_some() {
                    let text = std::str::from_utf8(e.as_ref())?;
                    property_content.push_str(text);
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?.to_owned();

                match local_name.as_str() {
                    "set" | "remove" => current_operation = None,
                    "prop" if current_operation.is_some() && current_prop_name.is_none() => {
                        in_prop = false;
                    }
                    _ if in_prop && current_prop_name.is_some() => {
                        property_depth -= 1;

                        if property_depth == 0 {
                            if let Some(qname) = current_prop_name.take() {
                                match current_operation {
                                    Some(SetOrRemove::Set) => {
                                        let value = if property_content.trim().is_empty() {
                                            PropertyValue::Empty
                                        } else if property_content.contains('<') {
                                            PropertyValue::Xml(property_content.clone())
                                        } else {
                                            PropertyValue::Text(property_content.clone())
                                        };

                                        request.set(DavProperty {
                                            name: qname,
                                            value: Some(value),
                                        });
                                    }
                                    Some(SetOrRemove::Remove) => {
                                        request.remove(qname);
                                    }
                                    None => {}
                                }
                            }

                            property_content.clear();
                        } else {
                            let name_bytes = e.name();
                            let name = std::str::from_utf8(name_bytes.as_ref())?;
                            property_content.push_str("</");
                            property_content.push_str(name);
                            property_content.push('>');
                        }
                    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_set_displayname() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:propertyupdate xmlns:D="DAV:">
  <D:set>
    <D:prop>
      <D:displayname>New Addressbook Name</D:displayname>
    </D:prop>
  </D:set>
</D:propertyupdate>"#;

        let req = parse_proppatch(xml).unwrap();
        let sets = req.sets();

        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name.local_name(), "displayname");
        assert_eq!(sets[0].as_text(), Some("New Addressbook Name"));
    }

    #[test]
    fn parse_remove_property() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:propertyupdate xmlns:D="DAV:" xmlns:CR="urn:ietf:params:xml:ns:carddav">
  <D:remove>
    <D:prop>
      <CR:addressbook-description/>
    </D:prop>
  </D:remove>
</D:propertyupdate>"#;

        let req = parse_proppatch(xml).unwrap();
        let removes = req.removes();

        assert_eq!(removes.len(), 1);
        assert_eq!(removes[0].local_name(), "addressbook-description");
    }

    #[test]
    fn parse_mixed_operations() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:propertyupdate xmlns:D="DAV:" xmlns:CR="urn:ietf:params:xml:ns:carddav">
  <D:set>
    <D:prop>
      <D:displayname>New Name</D:displayname>
      <CR:addressbook-description>Team contacts</CR:addressbook-description>
    </D:prop>
  </D:set>
  <D:remove>
    <D:prop>
      <D:quota-used-bytes/>
    </D:prop>
  </D:remove>
</D:propertyupdate>"#;

        let req = parse_proppatch(xml).unwrap();
        assert_eq!(req.sets().len(), 2);
        assert_eq!(req.removes().len(), 1);
    }
}
