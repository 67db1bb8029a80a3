pub mod delete;
pub mod get;
pub mod mkcol;
pub mod options;
pub mod propfind;
pub mod proppatch;
pub mod put;
pub mod report;

use salvo::Depot;
use salvo::Response;
use salvo::http::StatusCode;
use std::sync::Arc;

use hagaki_db::db::DbProvider;
use hagaki_service::auth::Principal;

use crate::db_handler::get_db_from_depot;
use crate::middleware::auth::get_principal_from_depot;
use crate::middleware::carddav_path::{CardDavPath, get_carddav_path_from_depot};

/// ## Summary
/// Pulls the request context every handler needs from the depot: the
/// parsed path, the authenticated principal, and the database provider.
///
/// Writes the failure status itself and returns `None` when anything is
/// missing, so handlers can simply early-return.
pub(crate) fn request_context(
    depot: &Depot,
    res: &mut Response,
) -> Option<(
    CardDavPath,
    Principal,
    Arc<dyn DbProvider + Send + Sync + 'static>,
)> {
    let Some(path) = get_carddav_path_from_depot(depot) else {
        tracing::error!("CardDAV path not found in depot");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return None;
    };
    let path = path.clone();

    let principal = match get_principal_from_depot(depot) {
        Ok(p) => p.clone(),
        Err(e) => {
            tracing::error!(error = %e, "Principal not found in depot");
            res.status_code(StatusCode::UNAUTHORIZED);
            return None;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            return None;
        }
    };

    Some((path, principal, provider))
}
