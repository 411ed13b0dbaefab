use folio_core::Config;

use crate::services::MediaAssetService;

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub assets: MediaAssetService,
}

impl AppState {
    pub fn new(config: Config, assets: MediaAssetService) -> Self {
        Self { config, assets }
    }
}
