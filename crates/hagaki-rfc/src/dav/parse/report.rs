//! REPORT request XML parsing.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::error::{ParseError, ParseResult};
use super::{collect_namespaces, resolve_qname};
use crate::dav::core::{
    MultigetRequest, PropertyName, ReportRequest, SyncCollectionRequest,
};

/// Parses a CardDAV REPORT body into the supported report types.
///
/// Supported: `addressbook-multiget` (RFC 6352 §8.7) and `sync-collection`
/// (RFC 6578). Any other root element is rejected as unsupported.
///
/// ## Errors
/// Returns an error if the XML is malformed or the report is unsupported.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_report(xml: &[u8]) -> ParseResult<ReportRequest> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut namespaces: Vec<(String, String)> = Vec::new();

    let mut root: Option<String> = None;
    let mut in_prop = false;
    let mut properties: Vec<PropertyName> = Vec::new();
    let mut hrefs: Vec<String> = Vec::new();
    let mut sync_token = String::new();
    let mut current_text: Option<TextTarget> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e) | Event::Empty(ref e)) => {
                let local_name_bytes = e.local_name();
                let local_name = std::str::from_utf8(local_name_bytes.as_ref())?.to_owned();

                collect_namespaces(e, &mut namespaces)?;

                // Empty elements emit no End event, so the capture target
                // must reset on every element
                current_text = None;

                if root.is_none() {
                    root = Some(local_name.clone());
                    continue;
                }

                match local_name.as_str() {
                    "prop" => in_prop = true,
                    "href" if !in_prop => current_text = Some(TextTarget::Href),
                    "sync-token" => current_text = Some(TextTarget::SyncToken),
                    "sync-level" | "limit" | "nresults" => {
                        // Recognized but unused sync-collection details
                    }
                    _ if in_prop => {
                        let qname = resolve_qname(e, &namespaces)?;
                        properties.push(PropertyName::new(qname));
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(target) = current_text {
                    let decoded = reader.decoder().decode(e.as_ref())?.to_string();
                    match target {
                        TextTarget::Href => hrefs.push(decoded),
                        TextTarget::SyncToken => sync_token = decoded,
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local_name_bytes = e.local_name();
                match std::str::from_utf8(local_name_bytes.as_ref())? {
                    "prop" => in_prop = false,
                    "href" | "sync-token" => current_text = None,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    match root.as_deref() {
        Some("addressbook-multiget") => Ok(ReportRequest::Multiget(MultigetRequest {
            properties,
            hrefs,
        })),
        Some("sync-collection") => Ok(ReportRequest::SyncCollection(SyncCollectionRequest {
            sync_token,
            properties,
        })),
        Some(other) => Err(ParseError::UnsupportedReport(other.to_string())),
        None => Err(ParseError::xml("empty REPORT body")),
    }
}

#[derive(Clone, Copy)]
enum TextTarget {
    Href,
    SyncToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_multiget() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<CR:addressbook-multiget xmlns:D="DAV:" xmlns:CR="urn:ietf:params:xml:ns:carddav">
  <D:prop>
    <D:getetag/>
    <CR:address-data/>
  </D:prop>
  <D:href>/carddav/addressbooks/alice/work/abc.vcf</D:href>
  <D:href>/carddav/addressbooks/alice/work/def.vcf</D:href>
</CR:addressbook-multiget>"#;

        let report = parse_report(xml).unwrap();
        let ReportRequest::Multiget(multiget) = report else {
            panic!("expected multiget");
        };

        assert_eq!(multiget.hrefs.len(), 2);
        assert_eq!(multiget.properties.len(), 2);
        assert_eq!(multiget.properties[1].local_name(), "address-data");
    }

    #[test]
    fn parse_sync_collection() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:sync-collection xmlns:D="DAV:">
  <D:sync-token>http://hagaki.io/ns/sync/7</D:sync-token>
  <D:sync-level>1</D:sync-level>
  <D:prop>
    <D:getetag/>
  </D:prop>
</D:sync-collection>"#;

        let report = parse_report(xml).unwrap();
        let ReportRequest::SyncCollection(sync) = report else {
            panic!("expected sync-collection");
        };

        assert_eq!(sync.sync_token, "http://hagaki.io/ns/sync/7");
        assert_eq!(sync.properties.len(), 1);
    }

    #[test]
    fn parse_initial_sync_has_empty_token() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:sync-collection xmlns:D="DAV:">
  <D:sync-token/>
  <D:prop>
    <D:getetag/>
  </D:prop>
</D:sync-collection>"#;

        let report = parse_report(xml).unwrap();
        let ReportRequest::SyncCollection(sync) = report else {
            panic!("expected sync-collection");
        };
        assert!(sync.sync_token.is_empty());
    }

    #[test]
    fn unsupported_report_rejected() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<CR:addressbook-query xmlns:D="DAV:" xmlns:CR="urn:ietf:params:xml:ns:carddav"/>"#;

        let err = parse_report(xml).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedReport(_)));
    }
}
