use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of characters of an upstream error body kept for diagnostics.
pub const BODY_PREVIEW_CHARS: usize = 200;

/// How a failed upstream response should be surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailureKind {
    /// The signed URL token is expired or invalid; the caller should mint a new URL.
    ExpiredSignedUrl,
    /// Any other upstream HTTP failure.
    Other,
}

static EXPIRY_PHRASE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)exp[a-z_\s]*(fail|expired)").expect("valid expiry phrase regex")
});

/// Returns the first `BODY_PREVIEW_CHARS` characters of a response body.
/// Non UTF-8 bytes are decoded lossily so binary bodies still produce a preview.
pub fn body_preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}

/// True when a body preview carries one of the markers object stores emit for
/// expired or malformed signed-URL tokens.
pub fn mentions_token_expiry(body_preview: &str) -> bool {
    let lower = body_preview.to_ascii_lowercase();
    lower.contains("invalidjwt")
        || lower.contains("\"exp\"")
        || EXPIRY_PHRASE_REGEX.is_match(body_preview)
}

/// True for the exact shape of a rejected signed URL: HTTP 400 plus an expiry marker.
pub fn is_expired_signed_url(status: u16, body_preview: &str) -> bool {
    status == 400 && mentions_token_expiry(body_preview)
}

pub fn classify_upstream_failure(status: u16, body_preview: &str) -> UpstreamFailureKind {
    if is_expired_signed_url(status, body_preview) {
        UpstreamFailureKind::ExpiredSignedUrl
    } else {
        UpstreamFailureKind::Other
    }
}
