//! DELETE method handler for cards and addressbook collections.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use hagaki_service::{addressbook, card};

use super::request_context;
use crate::app::api::carddav::response::write_service_error;
use crate::middleware::carddav_path::CardDavPath;

/// ## Summary
/// Deletes a card, or an entire addressbook (cascading its cards and
/// change log).
///
/// ## Errors
/// 404 for unknown resources, 403 for ownership mismatches.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn delete(req: &mut Request, res: &mut Response, depot: &Depot) {
    let Some((path, principal, provider)) = request_context(depot, res) else {
        return;
    };

    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let outcome = match path {
        CardDavPath::Addressbook { uri, .. } => {
            match addressbook::get_by_uri(&mut conn, &principal, &uri).await {
                Ok(book) => addressbook::delete(&mut conn, &principal, book.id).await,
                Err(e) => Err(e),
            }
        }
        CardDavPath::Card {
            addressbook_uri,
            card_uri,
            ..
        } => match addressbook::get_by_uri(&mut conn, &principal, &addressbook_uri).await {
            Ok(book) => card::delete_by_uri(&mut conn, &principal, book.id, &card_uri).await,
            Err(e) => Err(e),
        },
        CardDavPath::Root | CardDavPath::AddressbookHome { .. } => {
            res.status_code(StatusCode::METHOD_NOT_ALLOWED);
            return;
        }
    };

    match outcome {
        Ok(()) => {
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => write_service_error(res, &e),
    }
}
