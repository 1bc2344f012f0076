use super::events::EventRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Local scratch paths for one invocation.
///
/// Paths are derived from the object stem, so a rerun for the same key lands
/// on the same paths. Dropping the guard removes both, whatever state the
/// invocation ended in.
#[derive(Debug)]
pub struct StagingArea {
    input: PathBuf,
    output_dir: PathBuf,
}

impl StagingArea {
    pub fn new(staging_dir: &Path, record: &EventRecord) -> Self {
        Self {
            input: staging_dir.join(format!("{}{}", record.stem, record.extension)),
            output_dir: staging_dir.join(format!("{}_dash_output", record.stem)),
        }
    }

    pub fn input_path(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Remove anything a previous (possibly crashed) run left behind.
    pub fn reset(&self) -> io::Result<()> {
        if self.input.exists() {
            debug!("Removing stale input {}", self.input.display());
            fs::remove_file(&self.input)?;
        }
        if self.output_dir.exists() {
            debug!("Removing stale output {}", self.output_dir.display());
            fs::remove_dir_all(&self.output_dir)?;
        }
        Ok(())
    }

    fn cleanup(&self) {
        if let Err(e) = fs::remove_file(&self.input) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to delete {}: {}", self.input.display(), e);
            }
        }
        if let Err(e) = fs::remove_dir_all(&self.output_dir) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to delete {}: {}", self.output_dir.display(), e);
            }
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        self.cleanup();
    }
}
