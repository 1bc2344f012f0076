use crate::common::error::DashError;
use serde::Serialize;

/// Lambda result shape: `{"statusCode": ..., "body": ...}`.
#[derive(Debug, Serialize)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Text(String),
    Dash(DashOutput),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashOutput {
    pub message: String,
    pub manifest_url: String,
    pub files: Vec<String>,
    pub output_prefix: String,
}

impl HandlerResponse {
    pub fn success(output: DashOutput) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Dash(output),
        }
    }

    /// Validation failures carry their message as-is; everything else is
    /// reported as a server error with an `Error:` prefix.
    pub fn error(err: &DashError) -> Self {
        let body = match err {
            DashError::UnsupportedFormat { .. } => err.to_string(),
            _ => format!("Error: {}", err),
        };

        Self {
            status_code: err.status_code(),
            body: ResponseBody::Text(body),
        }
    }
}

#[cfg(test)]
impl HandlerResponse {
    pub fn body_text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Dash(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_lambda_shape() {
        let response = HandlerResponse::success(DashOutput {
            message: "DASH conversion successful".to_string(),
            manifest_url: "https://src.s3.amazonaws.com/dash/clip/manifest.mpd".to_string(),
            files: vec!["manifest.mpd".to_string()],
            output_prefix: "s3://src/dash/clip/".to_string(),
        });

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 200,
                "body": {
                    "message": "DASH conversion successful",
                    "manifest_url": "https://src.s3.amazonaws.com/dash/clip/manifest.mpd",
                    "files": ["manifest.mpd"],
                    "output_prefix": "s3://src/dash/clip/"
                }
            })
        );
    }

    #[test]
    fn server_errors_are_prefixed() {
        let response = HandlerResponse::error(&DashError::Transcode("boom".to_string()));
        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body_text(),
            Some("Error: FFmpeg failed with error: boom")
        );
    }

    #[test]
    fn unsupported_format_is_client_error() {
        let response = HandlerResponse::error(&DashError::UnsupportedFormat {
            ext: ".txt".to_string(),
            allowed: ".mp4".to_string(),
        });
        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.body_text(),
            Some("Unsupported format: .txt. Allowed: .mp4")
        );
    }
}
