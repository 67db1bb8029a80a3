//! Projection of store entities onto DAV properties.

use hagaki_core::constants::{
    ADDRESSBOOKS_ROUTE_COMPONENT, CARDDAV_ROUTE_PREFIX, MAX_VCARD_SIZE, VCARD_CONTENT_TYPE,
    format_sync_token,
};
use hagaki_db::db::etag::generate_etag;
use hagaki_db::model::addressbook::Addressbook;
use hagaki_db::model::card::Card;
use hagaki_rfc::dav::core::{
    CARDDAV_NS, DavProperty, PropertyName, PropertyValue, QName,
};
use hagaki_rfc::dav::core::{carddav_props, dav_props};

/// ## Summary
/// Builds the href of an owner's addressbook home.
#[must_use]
pub fn home_href(owner: &str) -> String {
    format!("{CARDDAV_ROUTE_PREFIX}/{ADDRESSBOOKS_ROUTE_COMPONENT}/{owner}/")
}

/// ## Summary
/// Builds the href of an addressbook collection.
#[must_use]
pub fn addressbook_href(owner: &str, uri: &str) -> String {
    format!("{CARDDAV_ROUTE_PREFIX}/{ADDRESSBOOKS_ROUTE_COMPONENT}/{owner}/{uri}/")
}

/// ## Summary
/// Builds the href of a card resource.
#[must_use]
pub fn card_href(owner: &str, addressbook_uri: &str, card_uri: &str) -> String {
    format!("{CARDDAV_ROUTE_PREFIX}/{ADDRESSBOOKS_ROUTE_COMPONENT}/{owner}/{addressbook_uri}/{card_uri}")
}

/// Properties served for an addressbook when the client sends allprop.
fn addressbook_allprop() -> Vec<PropertyName> {
    vec![
        PropertyName::new(dav_props::resourcetype()),
        PropertyName::new(dav_props::displayname()),
        PropertyName::new(carddav_props::addressbook_description()),
        PropertyName::new(carddav_props::getctag()),
        PropertyName::new(dav_props::sync_token()),
    ]
}

/// Properties served for a card when the client sends allprop.
fn card_allprop() -> Vec<PropertyName> {
    vec![
        PropertyName::new(dav_props::resourcetype()),
        PropertyName::new(dav_props::getetag()),
        PropertyName::new(dav_props::getcontenttype()),
        PropertyName::new(dav_props::getlastmodified()),
    ]
}

/// ## Summary
/// Projects an addressbook onto the requested DAV properties (`None`
/// requests the allprop set). Unknown names come back valueless and land
/// in the 404 propstat.
#[must_use]
pub fn addressbook_props(
    requested: Option<&[PropertyName]>,
    book: &Addressbook,
) -> Vec<DavProperty> {
    let allprop;
    let names = match requested {
        Some(names) => names,
        None => {
            allprop = addressbook_allprop();
            &allprop
        }
    };

    names
        .iter()
        .map(|name| addressbook_prop(name, book))
        .collect()
}

fn addressbook_prop(name: &PropertyName, book: &Addressbook) -> DavProperty {
    let qname = name.name.clone();

    match (name.namespace_uri(), name.local_name()) {
        ("DAV:", "resourcetype") => DavProperty::resource_type(
            qname,
            vec![QName::dav("collection"), QName::carddav("addressbook")],
        ),
        ("DAV:", "displayname") => DavProperty::text(qname, book.displayname.clone()),
        ("DAV:", "sync-token") => DavProperty::text(qname, format_sync_token(book.ctag)),
        ("DAV:", "owner") | ("DAV:", "current-user-principal") => {
            DavProperty::href(qname, home_href(&book.userid))
        }
        ("DAV:", "supported-report-set") => DavProperty {
            name: qname,
            value: Some(PropertyValue::Xml(
                "<D:supported-report><D:report><CR:addressbook-multiget/></D:report></D:supported-report>\
                 <D:supported-report><D:report><D:sync-collection/></D:report></D:supported-report>"
                    .to_string(),
            )),
        },
        (CARDDAV_NS, "addressbook-description") => match &book.description {
            Some(description) => DavProperty::text(qname, description.clone()),
            None => DavProperty::not_found(qname),
        },
        (CARDDAV_NS, "supported-address-data") => DavProperty {
            name: qname,
            value: Some(PropertyValue::Xml(
                "<CR:address-data-type content-type=\"text/vcard\" version=\"3.0\"/>".to_string(),
            )),
        },
        (CARDDAV_NS, "max-resource-size") => {
            DavProperty::text(qname, MAX_VCARD_SIZE.to_string())
        }
        ("http://calendarserver.org/ns/", "getctag") => {
            DavProperty::text(qname, book.ctag.to_string())
        }
        _ => DavProperty::not_found(qname),
    }
}

/// ## Summary
/// Projects a card onto the requested DAV properties (`None` requests the
/// allprop set).
#[must_use]
pub fn card_props(requested: Option<&[PropertyName]>, card: &Card) -> Vec<DavProperty> {
    let allprop;
    let names = match requested {
        Some(names) => names,
        None => {
            allprop = card_allprop();
            &allprop
        }
    };

    names.iter().map(|name| card_prop(name, card)).collect()
}

fn card_prop(name: &PropertyName, card: &Card) -> DavProperty {
    let qname = name.name.clone();

    match (name.namespace_uri(), name.local_name()) {
        ("DAV:", "resourcetype") => DavProperty::resource_type(qname, Vec::new()),
        ("DAV:", "getetag") => DavProperty::text(qname, generate_etag(card.carddata.as_bytes())),
        ("DAV:", "getcontenttype") => DavProperty::text(qname, VCARD_CONTENT_TYPE),
        ("DAV:", "getlastmodified") => DavProperty::text(
            qname,
            card.lastmodified
                .format("%a, %d %b %Y %H:%M:%S GMT")
                .to_string(),
        ),
        (CARDDAV_NS, "address-data") => DavProperty::text(qname, card.carddata.clone()),
        _ => DavProperty::not_found(qname),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Addressbook {
        Addressbook {
            id: 7,
            userid: "alice".to_string(),
            displayname: "Work".to_string(),
            uri: "work".to_string(),
            description: None,
            ctag: 17,
        }
    }

    fn sample_card() -> Card {
        Card {
            id: 1,
            addressbookid: 7,
            fullname: "John Doe".to_string(),
            carddata: "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:John Doe\r\nEND:VCARD\r\n".to_string(),
            uri: "abc.vcf".to_string(),
            lastmodified: chrono::DateTime::from_timestamp(0, 0).unwrap(),
        }
    }

    #[test_log::test]
    fn hrefs_follow_the_layout() {
        assert_eq!(home_href("alice"), "/carddav/addressbooks/alice/");
        assert_eq!(
            addressbook_href("alice", "work"),
            "/carddav/addressbooks/alice/work/"
        );
        assert_eq!(
            card_href("alice", "work", "abc.vcf"),
            "/carddav/addressbooks/alice/work/abc.vcf"
        );
    }

    #[test_log::test]
    fn getctag_projects_the_counter() {
        let props = addressbook_props(
            Some(&[PropertyName::new(carddav_props::getctag())]),
            &sample_book(),
        );
        assert_eq!(props[0].as_text(), Some("17"));
    }

    #[test_log::test]
    fn missing_description_is_not_found() {
        let props = addressbook_props(
            Some(&[PropertyName::new(carddav_props::addressbook_description())]),
            &sample_book(),
        );
        assert!(props[0].value.is_none());
    }

    #[test_log::test]
    fn unknown_property_is_not_found() {
        let props = addressbook_props(
            Some(&[PropertyName::new(QName::dav("quota-used-bytes"))]),
            &sample_book(),
        );
        assert!(props[0].value.is_none());
    }

    #[test_log::test]
    fn card_etag_matches_body_hash() {
        let card = sample_card();
        let props = card_props(Some(&[PropertyName::new(dav_props::getetag())]), &card);
        assert_eq!(
            props[0].as_text(),
            Some(generate_etag(card.carddata.as_bytes()).as_str())
        );
    }

    #[test_log::test]
    fn card_allprop_excludes_address_data() {
        let card = sample_card();
        let props = card_props(None, &card);
        assert!(
            props
                .iter()
                .all(|p| p.name.local_name() != "address-data")
        );
    }
}
