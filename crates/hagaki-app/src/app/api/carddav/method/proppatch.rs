//! PROPPATCH method handler for addressbook properties.
//!
//! Property updates are all-or-nothing: one unsupported property name
//! rejects the whole request, and nothing is applied.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use hagaki_rfc::dav::core::{
    CARDDAV_NS, DavProperty, Multistatus, Propstat, PropstatResponse, ProppatchRequest, QName,
    SetOrRemove, Status,
};
use hagaki_rfc::dav::parse::parse_proppatch;
use hagaki_service::addressbook;

use super::request_context;
use crate::app::api::carddav::props::addressbook_href;
use crate::app::api::carddav::response::{write_multistatus, write_service_error};
use crate::middleware::carddav_path::CardDavPath;

/// ## Summary
/// Applies displayname / addressbook-description updates to an
/// addressbook. Any other property name, and any remove, rejects the
/// request as a whole: the multistatus reports 403 for the offending
/// properties and 424 Failed Dependency for the rest, with no partial
/// application.
///
/// ## Errors
/// 400 for invalid XML, 404 for unknown collections.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn proppatch(req: &mut Request, res: &mut Response, depot: &Depot) {
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

    let request = match parse_proppatch(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse PROPPATCH body");
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

    let href = addressbook_href(&book.userid, &book.uri);

    // All-or-nothing validation before anything is written
    let unsupported = unsupported_updates(&request);
    if !unsupported.is_empty() {
        tracing::debug!(
            count = unsupported.len(),
            "PROPPATCH rejected: unsupported property mutation"
        );
        write_multistatus(res, &rejection_multistatus(&href, &request, &unsupported));
        return;
    }

    let mut displayname: Option<String> = None;
    let mut description: Option<String> = None;

    for prop in request.sets() {
        match (prop.name.namespace_uri(), prop.name.local_name()) {
            ("DAV:", "displayname") => displayname = prop.as_text().map(ToString::to_string),
            (CARDDAV_NS, "addressbook-description") => {
                description = prop.as_text().map(ToString::to_string);
            }
            _ => {}
        }
    }

    match addressbook::update(
        &mut conn,
        &principal,
        book.id,
        displayname.as_deref(),
        description.as_deref(),
    )
    .await
    {
        Ok(updated) => {
            tracing::info!(addressbook_id = updated.id, "Addressbook properties updated");

            let props = request
                .touched_names()
                .into_iter()
                .map(|name| DavProperty::not_found(name.clone()))
                .collect();

            write_multistatus(
                res,
                &Multistatus::new(vec![PropstatResponse {
                    href,
                    propstats: vec![Propstat {
                        status: Status::OK,
                        props,
                    }],
                    status: None,
                }]),
            );
        }
        Err(e) => write_service_error(res, &e),
    }
}

/// Returns the qualified names of updates outside the supported set
/// (displayname and addressbook-description sets; every remove counts).
fn unsupported_updates(request: &ProppatchRequest) -> Vec<QName> {
    request
        .updates
        .iter()
        .filter(|update| {
            if update.operation == SetOrRemove::Remove {
                return true;
            }
            !matches!(
                (
                    update.property.name.namespace_uri(),
                    update.property.name.local_name(),
                ),
                ("DAV:", "displayname") | (CARDDAV_NS, "addressbook-description")
            )
        })
        .map(|update| update.property.name.clone())
        .collect()
}

/// Builds the all-or-nothing rejection: 403 for offenders, 424 for the
/// rest.
fn rejection_multistatus(
    href: &str,
    request: &ProppatchRequest,
    unsupported: &[QName],
) -> Multistatus {
    let mut forbidden = Vec::new();
    let mut failed = Vec::new();

    for name in request.touched_names() {
        if unsupported.contains(name) {
            forbidden.push(DavProperty::not_found(name.clone()));
        } else {
            failed.push(DavProperty::not_found(name.clone()));
        }
    }

    let mut propstats = vec![Propstat {
        status: Status::FORBIDDEN,
        props: forbidden,
    }];
    if !failed.is_empty() {
        propstats.push(Propstat {
            status: Status::FAILED_DEPENDENCY,
            props: failed,
        });
    }

    Multistatus::new(vec![PropstatResponse {
        href: href.to_string(),
        propstats,
        status: None,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use hagaki_rfc::dav::core::dav_props;

    #[test_log::test]
    fn supported_sets_pass_validation() {
        let mut request = ProppatchRequest::new();
        request.set(DavProperty::text(dav_props::displayname(), "New"));
        request.set(DavProperty::text(
            QName::carddav("addressbook-description"),
            "Desc",
        ));

        assert!(unsupported_updates(&request).is_empty());
    }

    #[test_log::test]
    fn unknown_set_rejects() {
        let mut request = ProppatchRequest::new();
        request.set(DavProperty::text(dav_props::displayname(), "New"));
        request.set(DavProperty::text(QName::dav("getctag"), "3"));

        let unsupported = unsupported_updates(&request);
        assert_eq!(unsupported.len(), 1);
        assert_eq!(unsupported[0].local_name(), "getctag");
    }

    #[test_log::test]
    fn removes_reject() {
        let mut request = ProppatchRequest::new();
        request.remove(QName::carddav("addressbook-description"));

        assert_eq!(unsupported_updates(&request).len(), 1);
    }

    #[test_log::test]
    fn rejection_reports_forbidden_and_failed_dependency() {
        let mut request = ProppatchRequest::new();
        request.set(DavProperty::text(dav_props::displayname(), "New"));
        request.set(DavProperty::text(QName::dav("getctag"), "3"));

        let unsupported = unsupported_updates(&request);
        let multistatus = rejection_multistatus("/x/", &request, &unsupported);

        let propstats = &multistatus.responses[0].propstats;
        assert_eq!(propstats.len(), 2);
        assert_eq!(propstats[0].status, Status::FORBIDDEN);
        assert_eq!(propstats[1].status, Status::FAILED_DEPENDENCY);
        assert_eq!(propstats[1].props[0].name.local_name(), "displayname");
    }
}
