use std::env;

pub enum EnvKey {
    OutputBucket,
    FfmpegPath,
    StagingDir,
    S3Endpoint,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::OutputBucket => "DASH_OUTPUT_BUCKET",
            EnvKey::FfmpegPath => "FFMPEG_PATH",
            EnvKey::StagingDir => "DASH_STAGING_DIR",
            EnvKey::S3Endpoint => "S3_ENDPOINT",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Unset and empty values are both treated as absent.
pub fn get_opt(key: EnvKey) -> Option<String> {
    env::var(key.as_str()).ok().filter(|v| !v.trim().is_empty())
}
