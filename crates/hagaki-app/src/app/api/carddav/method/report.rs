//! REPORT method dispatch.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use hagaki_rfc::dav::core::ReportRequest;
use hagaki_rfc::dav::parse::{ParseError, parse_report};
use hagaki_service::addressbook;

use super::request_context;
use crate::app::api::carddav::report::{multiget, sync_collection};
use crate::app::api::carddav::response::write_service_error;
use crate::middleware::carddav_path::CardDavPath;

/// ## Summary
/// Dispatches the supported `CardDAV` REPORTs (`addressbook-multiget`,
/// `sync-collection`) against an addressbook collection.
///
/// ## Errors
/// 400 for invalid XML, 403 for unsupported report types, 404 for unknown
/// collections.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn report(req: &mut Request, res: &mut Response, depot: &Depot) {
    let Some((path, principal, provider)) = request_context(depot, res) else {
        return;
    };

    let CardDavPath::Addressbook { uri, .. } = path else {
        res.status_code(StatusCode::METHOD_NOT_ALLOWED);
        return;
    };

    let body = match req.payload().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            res.status_code(StatusCode::BAD_REQUEST);
            return;
        }
    };

    let request = match parse_report(body) {
        Ok(request) => request,
        Err(ParseError::UnsupportedReport(name)) => {
            tracing::debug!(report = %name, "Unsupported REPORT type");
            res.status_code(StatusCode::FORBIDDEN);
            return;
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse REPORT body");
            res.status_code(StatusCode::BAD_REQUEST);
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

    let book = match addressbook::get_by_uri(&mut conn, &principal, &uri).await {
        Ok(book) => book,
        Err(e) => {
            write_service_error(res, &e);
            return;
        }
    };

    match request {
        ReportRequest::Multiget(request) => {
            multiget::handle(&mut conn, res, &principal, &book, &request).await;
        }
        ReportRequest::SyncCollection(request) => {
            sync_collection::handle(&mut conn, res, &principal, &book, &request).await;
        }
    }
}
