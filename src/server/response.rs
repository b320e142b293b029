use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use super::types::{ErrorBody, UnsupportedTypeBody, UpstreamErrorBody};
use crate::error::ExtractionFailure;
use crate::utils::content_guard::{classify_upstream_failure, UpstreamFailureKind};

const SIGNED_URL_SUGGESTION: &str =
    "The signed URL appears to be expired or invalid. Generate a fresh URL and retry the request.";

/// Successful extraction body.
pub fn text_response(text: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response()
}

impl IntoResponse for ExtractionFailure {
    fn into_response(self) -> Response {
        match self {
            ExtractionFailure::MissingUrl => {
                warn!("Rejected request without url parameter");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody::new("Missing URL parameter")),
                )
                    .into_response()
            }
            ExtractionFailure::InvalidUrl(message) => {
                warn!("Rejected invalid url parameter: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody::with_message("Invalid URL parameter", message)),
                )
                    .into_response()
            }
            ExtractionFailure::UnsupportedType(info) => {
                warn!(
                    filename = %info.filename,
                    extension = %info.detected_extension,
                    ct = %info.content_type,
                    final_url = %info.final_url,
                    "Unsupported file type"
                );
                (
                    StatusCode::BAD_REQUEST,
                    Json(UnsupportedTypeBody {
                        error: "Unsupported file type".to_string(),
                        filename: info.filename,
                        detected_extension: info.detected_extension,
                        content_type: info.content_type,
                        final_url: info.final_url,
                    }),
                )
                    .into_response()
            }
            ExtractionFailure::EngineNotReady(message) => {
                warn!("PDF handler not ready: {}", message);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorBody::with_message("PDF handler not ready", message)),
                )
                    .into_response()
            }
            ExtractionFailure::UpstreamFetch(failure) => {
                match classify_upstream_failure(failure.status, &failure.body_preview) {
                    UpstreamFailureKind::ExpiredSignedUrl => {
                        warn!(
                            status = failure.status,
                            preview = %failure.body_preview,
                            "Upstream rejected signed URL token"
                        );
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(UpstreamErrorBody {
                                error: "Signed URL expired or invalid".to_string(),
                                upstream_status: failure.status,
                                upstream_content_type: failure.content_type,
                                upstream_body_preview: failure.body_preview,
                                message: None,
                                suggestion: Some(SIGNED_URL_SUGGESTION.to_string()),
                            }),
                        )
                            .into_response()
                    }
                    UpstreamFailureKind::Other => {
                        error!(
                            status = failure.status,
                            ct = ?failure.content_type,
                            preview = %failure.body_preview,
                            "Upstream fetch failed"
                        );
                        let message = format!("Upstream returned HTTP {}", failure.status);
                        (
                            StatusCode::BAD_GATEWAY,
                            Json(UpstreamErrorBody {
                                error: "Upstream fetch failed".to_string(),
                                upstream_status: failure.status,
                                upstream_content_type: failure.content_type,
                                upstream_body_preview: failure.body_preview,
                                message: Some(message),
                                suggestion: None,
                            }),
                        )
                            .into_response()
                    }
                }
            }
            ExtractionFailure::Network(message) | ExtractionFailure::Extraction(message) => {
                error!("Extraction failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::with_message("Extraction failed", message)),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnsupportedTypeInfo;
    use crate::utils::fetcher::UpstreamFailure;
    use serde_json::Value;

    async fn json_of(response: Response) -> (StatusCode, Value) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn upstream(status: u16, preview: &str) -> ExtractionFailure {
        ExtractionFailure::UpstreamFetch(UpstreamFailure {
            status,
            content_type: Some("application/json".to_string()),
            body_preview: preview.to_string(),
        })
    }

    #[tokio::test]
    async fn missing_url_is_400() {
        let (status, body) = json_of(ExtractionFailure::MissingUrl.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing URL parameter");
    }

    #[tokio::test]
    async fn unsupported_type_lists_debug_fields() {
        let failure = ExtractionFailure::UnsupportedType(UnsupportedTypeInfo {
            filename: "notes.txt".to_string(),
            detected_extension: "txt".to_string(),
            content_type: "text/plain".to_string(),
            final_url: "https://example.com/notes.txt".to_string(),
        });
        let (status, body) = json_of(failure.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["filename"], "notes.txt");
        assert_eq!(body["detectedExtension"], "txt");
        assert_eq!(body["contentType"], "text/plain");
        assert_eq!(body["finalUrl"], "https://example.com/notes.txt");
    }

    #[tokio::test]
    async fn expired_signed_url_is_401_with_suggestion() {
        let (status, body) =
            json_of(upstream(400, r#"{"error":"InvalidJWT"}"#).into_response()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["upstreamStatus"], 400);
        assert!(body["suggestion"].is_string());
        assert_eq!(body["upstreamBodyPreview"], r#"{"error":"InvalidJWT"}"#);
    }

    #[tokio::test]
    async fn other_upstream_errors_are_502() {
        let (status, body) = json_of(upstream(404, "Not Found").into_response()).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Upstream fetch failed");
        assert_eq!(body["message"], "Upstream returned HTTP 404");
        assert!(body.get("suggestion").is_none());
    }

    #[tokio::test]
    async fn engine_not_ready_is_503() {
        let (status, body) =
            json_of(ExtractionFailure::EngineNotReady("warming up".to_string()).into_response())
                .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "PDF handler not ready");
        assert_eq!(body["message"], "warming up");
    }

    #[tokio::test]
    async fn internal_failures_are_500() {
        for failure in [
            ExtractionFailure::Network("connection refused".to_string()),
            ExtractionFailure::Extraction("bad xref".to_string()),
        ] {
            let (status, body) = json_of(failure.into_response()).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["error"], "Extraction failed");
        }
    }

    #[tokio::test]
    async fn success_is_plain_text() {
        let response = text_response("hello\n".to_string());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
