use thiserror::Error;

use crate::utils::fetcher::{FetchError, UpstreamFailure};

/// Diagnostics returned to callers when a document type is not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedTypeInfo {
    pub filename: String,
    pub detected_extension: String,
    pub content_type: String,
    pub final_url: String,
}

/// Every way an `/extract` request can fail.
#[derive(Error, Debug)]
pub enum ExtractionFailure {
    #[error("Missing URL parameter")]
    MissingUrl,

    #[error("Invalid URL parameter: {0}")]
    InvalidUrl(String),

    #[error("Unsupported file type '{}' for {}", .0.detected_extension, .0.final_url)]
    UnsupportedType(UnsupportedTypeInfo),

    #[error("PDF handler not ready: {0}")]
    EngineNotReady(String),

    #[error("Upstream fetch failed with HTTP {}", .0.status)]
    UpstreamFetch(UpstreamFailure),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),
}

impl From<FetchError> for ExtractionFailure {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Upstream(failure) => ExtractionFailure::UpstreamFetch(failure),
            FetchError::Network(message) => ExtractionFailure::Network(message),
            FetchError::Client(message) => ExtractionFailure::Extraction(message),
        }
    }
}
