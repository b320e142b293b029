use reqwest::{header, redirect, Client};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::ServerConfig;
use crate::utils::content_guard::body_preview;
use crate::utils::type_detect::{detect, filename_from_path};

/// A document downloaded and typed, ready for extraction.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    pub raw_bytes: Vec<u8>,
    pub filename: String,
    pub extension: String,
    pub content_type: String,
    pub final_url: String,
}

/// An upstream HTTP error status together with a bounded preview of its body.
#[derive(Debug, Clone)]
pub struct UpstreamFailure {
    pub status: u16,
    pub content_type: Option<String>,
    pub body_preview: String,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP client error: {0}")]
    Client(String),

    /// No HTTP response was received (timeout, DNS, refused connection, TLS, redirect loop).
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned HTTP {}", .0.status)]
    Upstream(UpstreamFailure),
}

pub struct DocumentFetcher {
    client: Client,
}

impl DocumentFetcher {
    pub fn new(config: &ServerConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Downloads `url`, following redirects, and types the result from the
    /// final URL path with a Content-Type fallback.
    pub async fn fetch(&self, url: &Url) -> Result<ResolvedSource, FetchError> {
        info!(target: "fetcher", url = %url, "Starting HTTP fetch");
        let started = std::time::Instant::now();

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            warn!(target: "fetcher", url = %url, "HTTP transport error: {}", e);
            FetchError::Network(e.to_string())
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|s| s.to_string());

        if status.is_client_error() || status.is_server_error() {
            // A failed read here still leaves a useful status to report.
            let body = response.bytes().await.unwrap_or_default();
            let failure = UpstreamFailure {
                status: status.as_u16(),
                content_type,
                body_preview: body_preview(&body),
            };
            warn!(
                target: "fetcher",
                url = %url,
                status = failure.status,
                preview = %failure.body_preview,
                "HTTP error status from upstream"
            );
            return Err(FetchError::Upstream(failure));
        }

        let body = response.bytes().await.map_err(|e| {
            warn!(target: "fetcher", url = %url, "Body read failed: {}", e);
            FetchError::Network(e.to_string())
        })?;

        let source = resolve_source(url, &final_url, content_type, Vec::from(body));
        info!(
            target: "fetcher",
            url = %url,
            final_url = %source.final_url,
            size = source.raw_bytes.len(),
            ct = %source.content_type,
            extension = %source.extension,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "HTTP fetch completed"
        );
        Ok(source)
    }
}

/// Derives filename and extension for a fetched body. The filename comes from
/// the requested URL, or the final URL when the request path had none. The
/// extension follows the final URL path, then the Content-Type, then the
/// requested URL path.
pub fn resolve_source(
    requested: &Url,
    final_url: &str,
    content_type: Option<String>,
    raw_bytes: Vec<u8>,
) -> ResolvedSource {
    let final_url = Url::parse(final_url).unwrap_or_else(|_| requested.clone());

    let mut filename = filename_from_path(requested.path());
    if filename.is_empty() {
        filename = filename_from_path(final_url.path());
    }

    let mut extension = detect(final_url.path(), content_type.as_deref());
    if extension.is_empty() {
        extension = detect(requested.path(), None);
    }

    ResolvedSource {
        raw_bytes,
        filename,
        extension,
        content_type: content_type.unwrap_or_default(),
        final_url: final_url.to_string(),
    }
}
