use crate::config::settings::AppConfig;
use crate::infrastructure::storage::ObjectStorage;
use std::sync::Arc;

/// Shared across invocations for the lifetime of the process.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { config, storage }
    }
}
