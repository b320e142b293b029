// File-type detection from URL paths and Content-Type headers.
// Never looks at body bytes: the result depends on the path and header only.

/// Normalized document kinds the service can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "pdf" => DocumentKind::Pdf,
            "docx" => DocumentKind::Docx,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// Returns the last path segment, percent-decoded, with CR/LF removed and
/// surrounding whitespace trimmed. Empty when the path ends with `/`.
pub fn filename_from_path(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or("");
    let decoded = urlencoding::decode(last)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| last.to_string());

    decoded
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Substring after the last `.`, lowercased, restricted to `[a-z0-9]`.
pub fn extension_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) => filename[idx + 1..]
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .collect(),
        None => String::new(),
    }
}

/// Maps a Content-Type header onto a supported extension, if any.
pub fn extension_from_content_type(content_type: &str) -> Option<&'static str> {
    let ct = content_type.to_ascii_lowercase();
    if ct.contains("pdf") {
        return Some("pdf");
    }

    const DOCX_MARKERS: &[&str] = &["officedocument", "word", "msword", "application/vnd"];
    if DOCX_MARKERS.iter().any(|marker| ct.contains(marker)) {
        return Some("docx");
    }

    None
}

/// Detects the normalized extension for a URL path, falling back to the
/// Content-Type header when the path carries no extension.
pub fn detect(url_path: &str, content_type: Option<&str>) -> String {
    let extension = extension_of(&filename_from_path(url_path));
    if !extension.is_empty() {
        return extension;
    }

    content_type
        .and_then(extension_from_content_type)
        .map(str::to_string)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        for path in ["/docs/file.PDF", "/docs/file.pdf", "/docs/file.PdF"] {
            assert_eq!(detect(path, None), "pdf", "path {}", path);
        }
    }

    #[test]
    fn dotted_filename_keeps_last_extension() {
        let url = url::Url::parse("https://example.com/a/b/report.final.docx?x=1").unwrap();
        assert_eq!(filename_from_path(url.path()), "report.final.docx");
        assert_eq!(detect(url.path(), None), "docx");
    }

    #[test]
    fn content_type_fallback_applies_only_without_extension() {
        assert_eq!(detect("/download", Some("application/pdf")), "pdf");
        assert_eq!(
            detect("/download", Some("application/pdf; charset=binary")),
            "pdf"
        );
        assert_eq!(
            detect(
                "/download",
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            ),
            "docx"
        );
        assert_eq!(detect("/download", Some("application/msword")), "docx");
        assert_eq!(detect("/file.txt", Some("application/pdf")), "txt");
    }

    #[test]
    fn unknown_type_yields_empty_extension() {
        assert_eq!(detect("/download", None), "");
        assert_eq!(detect("/download", Some("text/html")), "");
        assert_eq!(detect("/", Some("image/png")), "");
    }

    #[test]
    fn filename_is_decoded_and_sanitized() {
        assert_eq!(filename_from_path("/files/My%20Report.pdf"), "My Report.pdf");
        assert_eq!(filename_from_path("/files/%20a.pdf%0D%0A"), "a.pdf");
        assert_eq!(filename_from_path("/files/"), "");
    }

    #[test]
    fn extension_strips_non_alphanumerics() {
        assert_eq!(extension_of("weird.P-D_F"), "pdf");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_extension("docx"), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_extension("doc"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_extension(""), DocumentKind::Unsupported);
    }
}
