//! Handler for the `sync-collection` REPORT (RFC 6578).

use salvo::Response;

use hagaki_db::db::connection::DbConnection;
use hagaki_db::model::addressbook::Addressbook;
use hagaki_rfc::dav::core::{Multistatus, PropstatResponse, Status, SyncCollectionRequest};
use hagaki_service::auth::Principal;
use hagaki_service::{card, sync};

use crate::app::api::carddav::props::{card_href, card_props};
use crate::app::api::carddav::response::{write_multistatus, write_service_error};

/// ## Summary
/// Answers with the collection's changes since the client's sync token:
/// added and modified members as property responses, deleted members as
/// bare 404 responses, and the fresh sync token.
pub async fn handle(
    conn: &mut DbConnection<'_>,
    res: &mut Response,
    principal: &Principal,
    book: &Addressbook,
    request: &SyncCollectionRequest,
) {
    let changes = match sync::changes_since(conn, principal, book.id, &request.sync_token).await {
        Ok(changes) => changes,
        Err(e) => {
            write_service_error(res, &e);
            return;
        }
    };

    let mut live_uris: Vec<String> =
        Vec::with_capacity(changes.added.len() + changes.modified.len());
    live_uris.extend(changes.added.iter().cloned());
    live_uris.extend(changes.modified.iter().cloned());

    let live = match card::multiget(conn, principal, book.id, &live_uris).await {
        Ok(live) => live,
        Err(e) => {
            write_service_error(res, &e);
            return;
        }
    };

    let requested = if request.properties.is_empty() {
        None
    } else {
        Some(request.properties.as_slice())
    };

    let mut responses = Vec::with_capacity(live.len() + changes.deleted.len());

    for member in &live {
        responses.push(PropstatResponse::from_properties(
            card_href(&book.userid, &book.uri, &member.uri),
            card_props(requested, member),
        ));
    }

    for uri in &changes.deleted {
        responses.push(PropstatResponse::with_status(
            card_href(&book.userid, &book.uri, uri),
            Status::NOT_FOUND,
        ));
    }

    let multistatus = Multistatus::new(responses).with_sync_token(changes.sync_token.clone());

    tracing::debug!(
        added = changes.added.len(),
        modified = changes.modified.len(),
        deleted = changes.deleted.len(),
        "sync-collection report built"
    );

    write_multistatus(res, &multistatus);
}
