use crate::config::env::{self, EnvKey};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_FFMPEG_PATH: &str = "/var/task/bin/ffmpeg";
pub const DEFAULT_STAGING_DIR: &str = "/tmp";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// Bucket receiving the DASH package.
    pub output_bucket: String,
    pub ffmpeg_path: PathBuf,
    /// Local scratch directory for the downloaded source and ffmpeg output.
    pub staging_dir: PathBuf,
    /// Custom endpoint for S3-compatible stores such as MinIO.
    pub s3_endpoint: Option<String>,
}

impl AppConfig {
    pub fn new() -> Result<Self, std::env::VarError> {
        Ok(Self {
            output_bucket: env::get(EnvKey::OutputBucket)?,
            ffmpeg_path: env::get_or(EnvKey::FfmpegPath, DEFAULT_FFMPEG_PATH).into(),
            staging_dir: env::get_or(EnvKey::StagingDir, DEFAULT_STAGING_DIR).into(),
            s3_endpoint: env::get_opt(EnvKey::S3Endpoint),
        })
    }
}
