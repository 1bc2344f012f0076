use super::{ObjectStorage, StorageError, StorageResult};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;
use tracing::{debug, info};

/// Process-wide S3 client.
///
/// Built once at startup and shared by every invocation the runtime hands us.
/// The underlying connection pool lives as long as the process, so there is
/// nothing to tear down.
#[derive(Clone)]
pub struct StorageService {
    pub client: Client,
}

impl StorageService {
    /// Load credentials and region from the standard AWS environment.
    ///
    /// When `endpoint` is set the client targets an S3-compatible store
    /// (MinIO, LocalStack) using path-style addressing.
    pub async fn new(endpoint: Option<&str>) -> Self {
        let shared_config = aws_config::load_defaults(BehaviorVersion::latest()).await;

        let mut builder = Builder::from(&shared_config);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
            info!(endpoint, "✅ S3 client configured for custom endpoint");
        } else {
            info!("✅ S3 client configured");
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ObjectStorage for StorageService {
    async fn download_to_file(&self, bucket: &str, key: &str, dest: &Path) -> StorageResult<()> {
        let result = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StorageError::DownloadFailed(format!(
                    "s3://{}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        let mut reader = result.body.into_async_read();
        let mut file = tokio::fs::File::create(dest).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;

        debug!(bucket, key, bytes = written, "Object written to {}", dest.display());
        Ok(())
    }

    async fn upload_file(
        &self,
        src: &Path,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        let body = ByteStream::from_path(src).await.map_err(|e| {
            StorageError::UploadFailed(format!("{}: {}", src.display(), e))
        })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StorageError::UploadFailed(format!(
                    "s3://{}/{}: {}",
                    bucket,
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}
