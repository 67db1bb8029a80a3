//! PUT method handler for vCard objects (`.vcf` resources).

use salvo::http::{HeaderValue, StatusCode};
use salvo::{Depot, Request, Response, handler};

use hagaki_core::constants::MAX_VCARD_SIZE;
use hagaki_db::db::etag::generate_etag;
use hagaki_db::db::query::card as card_query;
use hagaki_service::card;

use super::request_context;
use crate::app::api::carddav::response::write_service_error;
use crate::middleware::carddav_path::CardDavPath;

/// ## Summary
/// Stores a client-authored card at the request uri. The existence of a row
/// at that uri distinguishes create (201) from update (204); both carry the
/// new `ETag`.
///
/// The payload is trusted as canonical (client-authored) and stored
/// verbatim apart from VERSION/PRODID stamping; the full normalizer only
/// runs on the untrusted import paths.
///
/// ## Errors
/// 400 for invalid payloads, 412 for failed preconditions, 415 for a
/// non-vCard Content-Type, 413 for oversized bodies.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn put(req: &mut Request, res: &mut Response, depot: &Depot) {
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

    // Content-Type must be text/vcard when present (RFC 6352 §5.3.4)
    if let Some(content_type) = req.headers().get("Content-Type")
        && let Ok(ct_str) = content_type.to_str()
        && !ct_str.to_lowercase().starts_with("text/vcard")
    {
        tracing::debug!(content_type = %ct_str, "Unsupported Content-Type for vCard");
        res.status_code(StatusCode::UNSUPPORTED_MEDIA_TYPE);
        return;
    }

    let body = match req.payload().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    if body.len() > MAX_VCARD_SIZE {
        tracing::debug!(size = body.len(), max = MAX_VCARD_SIZE, "vCard too large");
        res.status_code(StatusCode::PAYLOAD_TOO_LARGE);
        return;
    }

    let if_none_match = req
        .headers()
        .get("If-None-Match")
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let if_match = req
        .headers()
        .get("If-Match")
        .and_then(|h| h.to_str().ok())
        .map(String::from);

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

    // Preconditions against the current row, if any
    let existing = match card_query::get_by_uri(&mut conn, book.id, &card_uri).await {
        Ok(existing) => existing,
        Err(e) => {
            tracing::error!(error = %e, "Failed to check for existing card");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    if if_none_match.as_deref() == Some("*") && existing.is_some() {
        tracing::debug!("Precondition failed: resource already exists");
        res.status_code(StatusCode::PRECONDITION_FAILED);
        return;
    }

    if let Some(expected) = &if_match {
        match &existing {
            Some(row) => {
                let current = generate_etag(row.carddata.as_bytes());
                if current != *expected {
                    tracing::debug!(expected = %expected, current = %current, "ETag mismatch");
                    res.status_code(StatusCode::PRECONDITION_FAILED);
                    return;
                }
            }
            None => {
                tracing::debug!("Precondition failed: resource does not exist");
                res.status_code(StatusCode::PRECONDITION_FAILED);
                return;
            }
        }
    }

    match card::put_trusted(&mut conn, &principal, book.id, &card_uri, &body).await {
        Ok(outcome) => {
            res.status_code(if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::NO_CONTENT
            });

            if let Ok(etag_value) = HeaderValue::from_str(&outcome.etag)
                && res.add_header("ETag", etag_value, true).is_err()
            {
                tracing::warn!("Failed to add ETag header to response");
            }
        }
        Err(e) => write_service_error(res, &e),
    }
}
