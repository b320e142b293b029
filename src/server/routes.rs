use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;
use url::Url;

use super::app::AppState;
use super::response::text_response;
use super::types::{ExtractParams, VersionInfo};
use crate::error::ExtractionFailure;

pub async fn root_handler() -> &'static str {
    "doctext-server is running\n"
}

pub async fn version_handler() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}

/// `GET /extract?url=<absolute-url>`
pub async fn extract_handler(
    State(state): State<AppState>,
    params: Result<Query<ExtractParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            return ExtractionFailure::InvalidUrl(rejection.body_text()).into_response()
        }
    };

    match run_extraction(&state, params.url.as_deref()).await {
        Ok(text) => text_response(text),
        Err(failure) => failure.into_response(),
    }
}

/// Validate, fetch, type and extract a single document.
pub async fn run_extraction(
    state: &AppState,
    raw_url: Option<&str>,
) -> Result<String, ExtractionFailure> {
    let url = validate_url(raw_url)?;
    info!(url = %url, "Extraction requested");

    let source = state.fetcher.fetch(&url).await?;
    state.extractor.extract(source).await
}

/// Parses the `url` query value into an absolute http(s) URL.
pub fn validate_url(raw_url: Option<&str>) -> Result<Url, ExtractionFailure> {
    let raw = match raw_url.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(ExtractionFailure::MissingUrl),
    };

    let url = Url::parse(raw).map_err(|e| ExtractionFailure::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractionFailure::InvalidUrl(format!(
            "unsupported URL scheme '{}'",
            other
        ))),
    }
}
