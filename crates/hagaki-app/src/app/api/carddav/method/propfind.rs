//! PROPFIND method handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use hagaki_db::db::connection::DbConnection;
use hagaki_rfc::dav::core::{Depth, Multistatus, PropertyName, PropstatResponse};
use hagaki_rfc::dav::parse::parse_propfind;
use hagaki_service::auth::Principal;
use hagaki_service::error::ServiceResult;
use hagaki_service::{addressbook, card};

use super::request_context;
use crate::app::api::carddav::props::{
    addressbook_href, addressbook_props, card_href, card_props, home_href,
};
use crate::app::api::carddav::response::{write_multistatus, write_service_error};
use crate::middleware::carddav_path::CardDavPath;

/// ## Summary
/// Answers PROPFIND on the addressbook home (listing the principal's
/// collections), on one addressbook (optionally listing its member cards),
/// or on a single card.
///
/// Requested-but-unknown properties come back in a 404 propstat; an
/// allprop request projects the default property set.
///
/// ## Errors
/// 400 for invalid XML or Depth, 403 for foreign homes, 404 for unknown
/// resources.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn propfind(req: &mut Request, res: &mut Response, depot: &Depot) {
    let Some((path, principal, provider)) = request_context(depot, res) else {
        return;
    };

    let depth = match req.headers().get("Depth").map(|h| h.to_str()) {
        None => Depth::default(),
        Some(Ok(value)) => match Depth::parse(value) {
            Some(depth) => depth,
            None => {
                tracing::debug!(depth = %value, "Invalid Depth header");
                res.status_code(StatusCode::BAD_REQUEST);
                return;
            }
        },
        Some(Err(_)) => {
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let body = match req.payload().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let request = match parse_propfind(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse PROPFIND body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let requested = request.requested_properties();

    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let result = match &path {
        CardDavPath::Root => {
            // Minimal root: point clients at their addressbook home
            Ok(Multistatus::new(vec![PropstatResponse::from_properties(
                format!("{}/", crate::app::api::CARDDAV_ROUTE_PREFIX),
                vec![hagaki_rfc::dav::core::DavProperty::href(
                    hagaki_rfc::dav::core::QName::dav("current-user-principal"),
                    home_href(&principal.name),
                )],
            )]))
        }
        CardDavPath::AddressbookHome { owner } => {
            if owner == &principal.name {
                home_multistatus(&mut conn, &principal, requested, depth).await
            } else {
                tracing::debug!(owner = %owner, caller = %principal.name, "PROPFIND on foreign home");
                res.status_code(StatusCode::FORBIDDEN);
                return;
            }
        }
        CardDavPath::Addressbook { uri, .. } => {
            collection_multistatus(&mut conn, &principal, uri, requested, depth).await
        }
        CardDavPath::Card {
            addressbook_uri,
            card_uri,
            ..
        } => card_multistatus(&mut conn, &principal, addressbook_uri, card_uri, requested).await,
    };

    match result {
        Ok(multistatus) => write_multistatus(res, &multistatus),
        Err(e) => write_service_error(res, &e),
    }
}

/// One response for the home itself, plus (depth 1) one per addressbook.
async fn home_multistatus(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    requested: Option<&[PropertyName]>,
    depth: Depth,
) -> ServiceResult<Multistatus> {
    let mut responses = vec![PropstatResponse::from_properties(
        home_href(&principal.name),
        home_collection_props(requested, principal),
    )];

    if depth.includes_members() {
        for book in addressbook::list(conn, principal).await? {
            responses.push(PropstatResponse::from_properties(
                addressbook_href(&book.userid, &book.uri),
                addressbook_props(requested, &book),
            ));
        }
    }

    Ok(Multistatus::new(responses))
}

/// One response for the addressbook, plus (depth 1) one per member card.
async fn collection_multistatus(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    uri: &str,
    requested: Option<&[PropertyName]>,
    depth: Depth,
) -> ServiceResult<Multistatus> {
    let book = addressbook::get_by_uri(conn, principal, uri).await?;

    let mut responses = vec![PropstatResponse::from_properties(
        addressbook_href(&book.userid, &book.uri),
        addressbook_props(requested, &book),
    )];

    if depth.includes_members() {
        for member in card::list(conn, principal, book.id).await? {
            responses.push(PropstatResponse::from_properties(
                card_href(&book.userid, &book.uri, &member.uri),
                card_props(requested, &member),
            ));
        }
    }

    Ok(Multistatus::new(responses))
}

/// The single-card response.
async fn card_multistatus(
    conn: &mut DbConnection<'_>,
    principal: &Principal,
    addressbook_uri: &str,
    card_uri: &str,
    requested: Option<&[PropertyName]>,
) -> ServiceResult<Multistatus> {
    let book = addressbook::get_by_uri(conn, principal, addressbook_uri).await?;
    let found = card::get_by_uri(conn, principal, book.id, card_uri).await?;

    Ok(Multistatus::new(vec![PropstatResponse::from_properties(
        card_href(&book.userid, &book.uri, &found.uri),
        card_props(requested, &found),
    )]))
}

/// Properties of the home collection itself.
fn home_collection_props(
    requested: Option<&[PropertyName]>,
    principal: &Principal,
) -> Vec<hagaki_rfc::dav::core::DavProperty> {
    use hagaki_rfc::dav::core::{DavProperty, QName, dav_props};

    let default_names = [
        PropertyName::new(dav_props::resourcetype()),
        PropertyName::new(dav_props::displayname()),
    ];

    let names: Vec<&PropertyName> = match requested {
        Some(names) => names.iter().collect(),
        None => default_names.iter().collect(),
    };

    names
        .into_iter()
        .map(|name| {
            let qname = name.name.clone();
            match (name.namespace_uri(), name.local_name()) {
                ("DAV:", "resourcetype") => {
                    DavProperty::resource_type(qname, vec![QName::dav("collection")])
                }
                ("DAV:", "displayname") => DavProperty::text(qname, principal.name.clone()),
                ("DAV:", "current-user-principal") | ("DAV:", "owner") => {
                    DavProperty::href(qname, home_href(&principal.name))
                }
                (
                    "urn:ietf:params:xml:ns:carddav",
                    "addressbook-home-set",
                ) => DavProperty::href(qname, home_href(&principal.name)),
                _ => DavProperty::not_found(qname),
            }
        })
        .collect()
}
