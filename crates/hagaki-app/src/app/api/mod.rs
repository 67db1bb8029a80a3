mod carddav;

use salvo::Router;

use crate::middleware::{auth::AuthMiddleware, carddav_path::CardDavPathMiddleware};

pub use hagaki_core::constants::{CARDDAV_ROUTE_COMPONENT, CARDDAV_ROUTE_PREFIX};

/// ## Summary
/// Constructs the main API router with the `CardDAV` handlers.
///
/// ## Errors
/// Returns an error if any child route handler fails to initialize.
pub fn routes() -> anyhow::Result<Router> {
    Ok(Router::with_path(CARDDAV_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .hoop(CardDavPathMiddleware)
        .push(carddav::routes()?))
}
