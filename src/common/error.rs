use crate::infrastructure::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashError {
    #[error("Unsupported format: {ext}. Allowed: {allowed}")]
    UnsupportedFormat { ext: String, allowed: String },

    #[error("Malformed S3 event: {0}")]
    MalformedEvent(String),

    #[error("Invalid transcode configuration: {0}")]
    Config(String),

    #[error("FFmpeg failed with error: {0}")]
    Transcode(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashError {
    pub fn status_code(&self) -> u16 {
        match self {
            DashError::UnsupportedFormat { .. } => 400,
            _ => 500,
        }
    }
}
