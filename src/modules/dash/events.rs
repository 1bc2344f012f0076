use crate::common::error::DashError;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

pub const ALLOWED_EXTENSIONS: [&str; 5] = [".mp4", ".mkv", ".mov", ".avi", ".webm"];

// Only the fields we read; everything else in the notification is ignored.

#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records")]
    pub records: Vec<S3Record>,
}

#[derive(Debug, Deserialize)]
pub struct S3Record {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// The uploaded object this invocation is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub bucket: String,
    /// Decoded object key.
    pub key: String,
    /// Lower-cased, with the leading dot. Empty when the key has none.
    pub extension: String,
    pub stem: String,
}

impl EventRecord {
    /// Read the first record of an S3 notification.
    pub fn from_event(payload: Value) -> Result<Self, DashError> {
        let event: S3Event = serde_json::from_value(payload)
            .map_err(|e| DashError::MalformedEvent(e.to_string()))?;

        let record = event
            .records
            .into_iter()
            .next()
            .ok_or_else(|| DashError::MalformedEvent("event contains no records".to_string()))?;

        Ok(Self::new(record.s3.bucket.name, decode_key(&record.s3.object.key)))
    }

    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        let key = key.into();
        let path = Path::new(&key);

        let extension = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            bucket: bucket.into(),
            key,
            extension,
            stem,
        }
    }

    pub fn validate(&self) -> Result<(), DashError> {
        if ALLOWED_EXTENSIONS.contains(&self.extension.as_str()) {
            Ok(())
        } else {
            Err(DashError::UnsupportedFormat {
                ext: self.extension.clone(),
                allowed: ALLOWED_EXTENSIONS.join(", "),
            })
        }
    }

    /// Destination key prefix, without trailing slash.
    pub fn dash_prefix(&self) -> String {
        format!("dash/{}", self.stem)
    }
}

/// S3 delivers keys form-encoded: `+` is a space, everything else is
/// percent-escaped. Invalid UTF-8 is replaced rather than rejected.
pub fn decode_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}
