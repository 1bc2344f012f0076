use super::events::EventRecord;
use super::staging::StagingArea;
use crate::common::error::DashError;
use crate::common::response::DashOutput;
use crate::state::AppState;
use crate::workers::transcoder::{self, MANIFEST_EXTENSION, MANIFEST_NAME, RESOLUTIONS, TranscodeJob};
use std::path::Path;
use tracing::info;

pub const DASH_CONTENT_TYPE: &str = "application/dash+xml";
pub const SEGMENT_CONTENT_TYPE: &str = "video/mp4";

pub fn content_type_for(file: &Path) -> &'static str {
    match file.extension() {
        Some(ext) if ext == MANIFEST_EXTENSION => DASH_CONTENT_TYPE,
        _ => SEGMENT_CONTENT_TYPE,
    }
}

pub struct DashService;

impl DashService {
    /// Download, transcode and publish one validated upload.
    ///
    /// Staging paths are removed when this returns, on success and on error.
    pub async fn process(state: &AppState, record: &EventRecord) -> Result<DashOutput, DashError> {
        let staging = StagingArea::new(&state.config.staging_dir, record);
        staging.reset()?;

        info!("⬇️ Downloading s3://{}/{}", record.bucket, record.key);
        state
            .storage
            .download_to_file(&record.bucket, &record.key, staging.input_path())
            .await?;

        let job = TranscodeJob::new(staging.input_path(), staging.output_dir(), &RESOLUTIONS);
        let ffmpeg = state.config.ffmpeg_path.clone();
        let files = tokio::task::spawn_blocking(move || transcoder::run(&ffmpeg, &job))
            .await
            .map_err(|e| DashError::Transcode(format!("transcode task aborted: {}", e)))??;

        let dash_prefix = record.dash_prefix();
        for name in &files {
            let path = staging.output_dir().join(name);
            let key = format!("{}/{}", dash_prefix, name);
            let content_type = content_type_for(&path);

            state
                .storage
                .upload_file(&path, &state.config.output_bucket, &key, content_type)
                .await?;
        }
        info!(
            "⬆️ Uploaded {} files to s3://{}/{}/",
            files.len(),
            state.config.output_bucket,
            dash_prefix
        );

        // Both URLs name the source bucket although the package is written to
        // the output bucket. Downstream consumers already parse this shape.
        Ok(DashOutput {
            message: "DASH conversion successful".to_string(),
            manifest_url: format!(
                "https://{}.s3.amazonaws.com/{}/{}",
                record.bucket, dash_prefix, MANIFEST_NAME
            ),
            files,
            output_prefix: format!("s3://{}/{}/", record.bucket, dash_prefix),
        })
    }
}
