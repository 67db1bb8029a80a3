//! Handler for the `addressbook-multiget` REPORT (RFC 6352 §8.7).

use std::collections::HashMap;

use salvo::Response;

use hagaki_db::db::connection::DbConnection;
use hagaki_db::model::addressbook::Addressbook;
use hagaki_rfc::dav::core::{MultigetRequest, Multistatus, PropstatResponse, Status};
use hagaki_service::auth::Principal;
use hagaki_service::card;

use crate::app::api::carddav::props::{card_href, card_props};
use crate::app::api::carddav::response::{write_multistatus, write_service_error};

/// ## Summary
/// Resolves the requested hrefs against the collection and answers with
/// one response per href: the requested properties for found cards, a bare
/// 404 response for missing ones.
pub async fn handle(
    conn: &mut DbConnection<'_>,
    res: &mut Response,
    principal: &Principal,
    book: &Addressbook,
    request: &MultigetRequest,
) {
    // The last path segment of each href addresses the card inside this
    // collection
    let uris: Vec<String> = request
        .hrefs
        .iter()
        .filter_map(|href| href.trim_end_matches('/').rsplit('/').next())
        .map(ToString::to_string)
        .collect();

    let found = match card::multiget(conn, principal, book.id, &uris).await {
        Ok(found) => found,
        Err(e) => {
            write_service_error(res, &e);
            return;
        }
    };

    let by_uri: HashMap<&str, &hagaki_db::model::card::Card> =
        found.iter().map(|c| (c.uri.as_str(), c)).collect();

    let requested = if request.properties.is_empty() {
        None
    } else {
        Some(request.properties.as_slice())
    };

    let mut responses = Vec::with_capacity(uris.len());
    for uri in &uris {
        match by_uri.get(uri.as_str()) {
            Some(member) => responses.push(PropstatResponse::from_properties(
                card_href(&book.userid, &book.uri, &member.uri),
                card_props(requested, member),
            )),
            None => responses.push(PropstatResponse::with_status(
                card_href(&book.userid, &book.uri, uri),
                Status::NOT_FOUND,
            )),
        }
    }

    write_multistatus(res, &Multistatus::new(responses));
}
