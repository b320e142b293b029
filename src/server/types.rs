use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ExtractParams {
    pub url: Option<String>,
}

/// Generic error body: `{error, message?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsupportedTypeBody {
    pub error: String,
    pub filename: String,
    pub detected_extension: String,
    pub content_type: String,
    pub final_url: String,
}

/// Upstream failure body shared by the 401 (expired signed URL) and 502 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamErrorBody {
    pub error: String,
    pub upstream_status: u16,
    pub upstream_content_type: Option<String>,
    pub upstream_body_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub build: String,
    pub features: Vec<String>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            build: env!("CARGO_PKG_VERSION").to_string(),
            features: vec!["pdf".to_string(), "docx".to_string()],
        }
    }
}
