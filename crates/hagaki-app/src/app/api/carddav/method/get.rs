//! GET method handler for card resources.

use salvo::http::{HeaderValue, StatusCode};
use salvo::{Depot, Request, Response, handler};

use hagaki_core::constants::VCARD_CONTENT_TYPE;
use hagaki_db::db::etag::generate_etag;
use hagaki_service::card;

use super::request_context;
use crate::app::api::carddav::response::write_service_error;
use crate::middleware::carddav_path::CardDavPath;

/// ## Summary
/// Serves a card body as `text/vcard` with its `ETag`.
///
/// ## Errors
/// 404 for unknown uris, 405 for GET on collections.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn get(req: &mut Request, res: &mut Response, depot: &Depot) {
    let Some((path, principal, provider)) = request_context(depot, res) else {
        return;
    };

    let CardDavPath::Card {
        addressbook_uri,
        card_uri,
        ..
    } = path
    else {
        res.status_code(StatusCode::METHOD_NOT_ALLOWED);
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

    let book = match hagaki_service::addressbook::get_by_uri(&mut conn, &principal, &addressbook_uri)
        .await
    {
        Ok(book) => book,
        Err(e) => {
            write_service_error(res, &e);
            return;
        }
    };

    match card::get_by_uri(&mut conn, &principal, book.id, &card_uri).await {
        Ok(found) => {
            res.status_code(StatusCode::OK);

            let etag = generate_etag(found.carddata.as_bytes());
            if let Ok(etag_value) = HeaderValue::from_str(&etag)
                && res.add_header("ETag", etag_value, true).is_err()
            {
                tracing::warn!("Failed to add ETag header to response");
            }
            #[expect(
                clippy::let_underscore_must_use,
                reason = "Header addition failure is non-fatal"
            )]
            let _ = res.add_header(
                "Content-Type",
                HeaderValue::from_static(VCARD_CONTENT_TYPE),
                true,
            );
            #[expect(
                clippy::let_underscore_must_use,
                reason = "Write body failure is non-fatal"
            )]
            let _ = res.write_body(found.carddata);
        }
        Err(e) => write_service_error(res, &e),
    }
}
