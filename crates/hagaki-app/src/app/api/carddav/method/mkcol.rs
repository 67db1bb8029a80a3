//! Extended MKCOL method handler (RFC 5689) for addressbook creation.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use hagaki_rfc::dav::core::MkcolRequest;
use hagaki_rfc::dav::parse::parse_mkcol;
use hagaki_service::addressbook;

use super::request_context;
use crate::app::api::carddav::response::write_service_error;
use crate::middleware::carddav_path::CardDavPath;

/// ## Summary
/// Creates an addressbook collection at the request uri, applying the
/// initial displayname / addressbook-description from the Extended MKCOL
/// body.
///
/// ## Errors
/// 400 for invalid XML, 403 when the target home is not the principal's,
/// 409 when the uri already exists.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn mkcol(req: &mut Request, res: &mut Response, depot: &Depot) {
    let Some((path, principal, provider)) = request_context(depot, res) else {
        return;
    };

    let CardDavPath::Addressbook { owner, uri } = path else {
        res.status_code(StatusCode::METHOD_NOT_ALLOWED);
        return;
    };

    // Collections are only created under the principal's own home
    if owner != principal.name {
        tracing::debug!(owner = %owner, caller = %principal.name, "MKCOL outside own home");
        res.status_code(StatusCode::FORBIDDEN);
        return;
    }

    let parsed_request = match req.payload().await {
        Ok(bytes) if !bytes.is_empty() => match parse_mkcol(bytes) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to parse Extended MKCOL body");
                res.status_code(StatusCode::BAD_REQUEST);
                return;
            }
        },
        Ok(_) => MkcolRequest::default(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database connection");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return;
        }
    };

    let displayname = parsed_request.displayname.as_deref().unwrap_or(&uri);

    match addressbook::create_at_uri(
        &mut conn,
        &principal,
        &uri,
        displayname,
        parsed_request.description.as_deref(),
    )
    .await
    {
        Ok(created) => {
            tracing::info!(addressbook_id = created.id, uri = %created.uri, "Addressbook created");
            res.status_code(StatusCode::CREATED);
        }
        Err(e) => write_service_error(res, &e),
    }
}
