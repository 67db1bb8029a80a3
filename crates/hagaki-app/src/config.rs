use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use hagaki_core::config::Settings;
use hagaki_core::error::CoreError;

/// Injects the loaded settings into the depot for downstream handlers.
pub struct ConfigHandler {
    pub settings: Settings,
}

#[async_trait]
impl salvo::Handler for ConfigHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::new(self.settings.clone()));
    }
}

/// ## Summary
/// Retrieves the settings from the depot.
///
/// ## Errors
/// Returns an error if the settings are not found in the depot.
pub fn get_config_from_depot(depot: &salvo::Depot) -> AppResult<Arc<Settings>> {
    depot
        .obtain::<Arc<Settings>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Settings not found in depot").into())
}
