use crate::config::settings::AppConfig;
use crate::infrastructure::storage::StorageService;
use crate::state::AppState;
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

pub async fn create_state() -> anyhow::Result<AppState> {
    let config = AppConfig::new().context("Failed to load configuration")?;

    info!(
        output_bucket = %config.output_bucket,
        ffmpeg = %config.ffmpeg_path.display(),
        staging_dir = %config.staging_dir.display(),
        "Configuration loaded"
    );

    let storage = StorageService::new(config.s3_endpoint.as_deref()).await;

    Ok(AppState::new(config, Arc::new(storage)))
}
