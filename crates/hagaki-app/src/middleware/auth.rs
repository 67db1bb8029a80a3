use salvo::Depot;
use tracing::error;

use crate::config::get_config_from_depot;
use hagaki_service::auth::{Principal, authenticate};
use hagaki_service::error::ServiceError;

/// Depot key under which the authenticated principal is stored.
pub const PRINCIPAL_DEPOT_KEY: &str = "authenticated_principal";

/// ## Summary
/// Authentication middleware that authenticates the request and stores the
/// principal in the depot. OPTIONS requests pass through unauthenticated so
/// clients can discover the DAV capabilities.
///
/// ## Side Effects
/// Inserts the authenticated [`Principal`] into the depot for downstream
/// handlers.
///
/// ## Errors
/// Returns an HTTP 401 Unauthorized response (with a Basic challenge) if
/// authentication fails.
pub struct AuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        if req.method() == salvo::http::Method::OPTIONS {
            return;
        }

        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        match authenticate(req, &config) {
            Ok(principal) => {
                tracing::debug!(user = %principal.name, "Request authenticated");
                depot.insert(PRINCIPAL_DEPOT_KEY, principal);
            }
            Err(ServiceError::NotAuthenticated) => {
                tracing::debug!("Request not authenticated");
                res.status_code(salvo::http::StatusCode::UNAUTHORIZED);
                #[expect(
                    clippy::let_underscore_must_use,
                    reason = "Challenge header addition failure is non-fatal"
                )]
                let _ = res.add_header("WWW-Authenticate", "Basic realm=\"hagaki\"", true);
                ctrl.skip_rest();
            }
            Err(service_err) => {
                error!(error = ?service_err, "Authentication failed with error");
                res.status_code(salvo::http::StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Retrieves the authenticated principal from the depot.
///
/// ## Errors
/// Returns `NotAuthenticated` when the middleware did not run or rejected
/// the request.
pub fn get_principal_from_depot(depot: &Depot) -> Result<&Principal, ServiceError> {
    depot
        .get::<Principal>(PRINCIPAL_DEPOT_KEY)
        .map_err(|_err| ServiceError::NotAuthenticated)
}
