//! Object storage seam used by the DASH handler.
//!
//! The handler only ever needs two operations: pull one object down to a local
//! file, and push local files back up with an explicit content type. Keeping
//! them behind a trait lets the handler run against an in-memory store in
//! tests and against S3 in production.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

pub mod s3;

pub use s3::StorageService;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Fetch `bucket/key` into `dest`, creating or truncating the file.
    async fn download_to_file(&self, bucket: &str, key: &str, dest: &Path) -> StorageResult<()>;

    /// Upload the file at `src` to `bucket/key` with the given content type.
    async fn upload_file(
        &self,
        src: &Path,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()>;
}
