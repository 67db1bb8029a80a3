//! Multistatus response XML serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use thiserror::Error;

use crate::dav::core::{
    CARDDAV_NS, CS_NS, DAV_NS, DavProperty, Multistatus, PropertyValue, Propstat, QName,
};

/// An error serializing a multistatus body.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("XML write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("multistatus produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a [`Multistatus`] into an XML document.
///
/// The three well-known namespaces are declared on the root element with
/// their conventional prefixes; anything else gets an inline declaration.
///
/// ## Errors
/// Returns an error if XML writing fails.
#[tracing::instrument(skip(multistatus), fields(responses = multistatus.responses.len()))]
pub fn serialize_multistatus(multistatus: &Multistatus) -> Result<String, BuildError> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("D:multistatus");
    root.push_attribute(("xmlns:D", DAV_NS));
    root.push_attribute(("xmlns:CR", CARDDAV_NS));
    root.push_attribute(("xmlns:CS", CS_NS));
    writer.write_event(Event::Start(root))?;

    for response in &multistatus.responses {
        writer.write_event(Event::Start(BytesStart::new("D:response")))?;

        write_text_element(&mut writer, "D:href", &response.href)?;

        if let Some(status) = response.status {
            write_text_element(&mut writer, "D:status", &status.as_line())?;
        }

        for propstat in &response.propstats {
            write_propstat(&mut writer, propstat)?;
        }

        writer.write_event(Event::End(BytesEnd::new("D:response")))?;
    }

    if let Some(token) = &multistatus.sync_token {
        write_text_element(&mut writer, "D:sync-token", token)?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:multistatus")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_propstat(writer: &mut Writer<Vec<u8>>, propstat: &Propstat) -> Result<(), BuildError> {
    writer.write_event(Event::Start(BytesStart::new("D:propstat")))?;
    writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

    for prop in &propstat.props {
        write_property(writer, prop)?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
    write_text_element(writer, "D:status", &propstat.status.as_line())?;
    writer.write_event(Event::End(BytesEnd::new("D:propstat")))?;

    Ok(())
}

fn write_property(writer: &mut Writer<Vec<u8>>, prop: &DavProperty) -> Result<(), BuildError> {
    let (tag, inline_ns) = prefixed_name(&prop.name);

    let mut start = BytesStart::new(tag.clone());
    if let Some(ns) = inline_ns {
        start.push_attribute(("xmlns:X", ns.as_str()));
    }

    match &prop.value {
        None | Some(PropertyValue::Empty) => {
            writer.write_event(Event::Empty(start))?;
        }
        Some(PropertyValue::Text(text)) => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        Some(PropertyValue::Xml(xml)) => {
            writer.write_event(Event::Start(start))?;
            // Already-serialized XML fragment, written through verbatim
            writer.write_event(Event::Text(BytesText::from_escaped(xml.as_str())))?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        Some(PropertyValue::Href(href)) => {
            writer.write_event(Event::Start(start))?;
            write_text_element(writer, "D:href", href)?;
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        Some(PropertyValue::ResourceType(types)) => {
            if types.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                for qname in types {
                    let (child_tag, child_ns) = prefixed_name(qname);
                    let mut child = BytesStart::new(child_tag);
                    if let Some(ns) = child_ns {
                        child.push_attribute(("xmlns:X", ns.as_str()));
                    }
                    writer.write_event(Event::Empty(child))?;
                }
                writer.write_event(Event::End(BytesEnd::new(tag)))?;
            }
        }
    }

    Ok(())
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    tag: &str,
    text: &str,
) -> Result<(), BuildError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Returns the prefixed tag for a qname, plus a namespace URI needing an
/// inline declaration when the namespace has no conventional prefix.
fn prefixed_name(qname: &QName) -> (String, Option<String>) {
    if let Some(prefix) = qname.namespace.default_prefix() {
        (format!("{prefix}:{}", qname.local_name()), None)
    } else {
        (
            format!("X:{}", qname.local_name()),
            Some(qname.namespace_uri().to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dav::core::{PropstatResponse, Status, carddav_props, dav_props};

    #[test]
    fn serialize_simple_multistatus() {
        let multistatus = Multistatus::new(vec![PropstatResponse::from_properties(
            "/carddav/addressbooks/alice/work/",
            vec![
                DavProperty::text(dav_props::displayname(), "Work"),
                DavProperty::text(carddav_props::getctag(), "17"),
            ],
        )]);

        let xml = serialize_multistatus(&multistatus).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<D:multistatus"));
        assert!(xml.contains("<D:href>/carddav/addressbooks/alice/work/</D:href>"));
        assert!(xml.contains("<D:displayname>Work</D:displayname>"));
        assert!(xml.contains("<CS:getctag>17</CS:getctag>"));
        assert!(xml.contains("HTTP/1.1 200 OK"));
    }

    #[test]
    fn serialize_not_found_propstat() {
        let multistatus = Multistatus::new(vec![PropstatResponse::from_properties(
            "/x",
            vec![DavProperty::not_found(QName::dav("quota-used-bytes"))],
        )]);

        let xml = serialize_multistatus(&multistatus).unwrap();
        assert!(xml.contains("<D:quota-used-bytes/>"));
        assert!(xml.contains("HTTP/1.1 404 Not Found"));
    }

    #[test]
    fn serialize_resourcetype() {
        let multistatus = Multistatus::new(vec![PropstatResponse::from_properties(
            "/x",
            vec![DavProperty::resource_type(
                dav_props::resourcetype(),
                vec![QName::dav("collection"), QName::carddav("addressbook")],
            )],
        )]);

        let xml = serialize_multistatus(&multistatus).unwrap();
        assert!(xml.contains("<D:collection/>"));
        assert!(xml.contains("<CR:addressbook/>"));
    }

    #[test]
    fn serialize_deleted_member_status() {
        let multistatus = Multistatus::new(vec![PropstatResponse::with_status(
            "/carddav/addressbooks/alice/work/gone.vcf",
            Status::NOT_FOUND,
        )])
        .with_sync_token("http://hagaki.io/ns/sync/9");

        let xml = serialize_multistatus(&multistatus).unwrap();
        assert!(xml.contains("<D:status>HTTP/1.1 404 Not Found</D:status>"));
        assert!(xml.contains("<D:sync-token>http://hagaki.io/ns/sync/9</D:sync-token>"));
    }

    #[test]
    fn text_content_is_escaped() {
        let multistatus = Multistatus::new(vec![PropstatResponse::from_properties(
            "/x",
            vec![DavProperty::text(
                dav_props::displayname(),
                "Tom & Jerry <3",
            )],
        )]);

        let xml = serialize_multistatus(&multistatus).unwrap();
        assert!(xml.contains("Tom &amp; Jerry &lt;3"));
    }
}
