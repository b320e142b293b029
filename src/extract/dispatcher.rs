use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use super::docx::{DocxBackend, OoxmlBackend};
use super::engine::{EngineError, PdfEngineHandle};
use super::pdf::render_pages;
use crate::error::{ExtractionFailure, UnsupportedTypeInfo};
use crate::utils::fetcher::ResolvedSource;
use crate::utils::type_detect::DocumentKind;

/// Routes fetched documents to the PDF or DOCX engine.
#[derive(Clone)]
pub struct Extractor {
    pdf_engine: PdfEngineHandle,
    docx: Arc<dyn DocxBackend>,
    engine_wait: Duration,
}

impl Extractor {
    pub fn new(
        pdf_engine: PdfEngineHandle,
        docx: Arc<dyn DocxBackend>,
        engine_wait: Duration,
    ) -> Self {
        Self {
            pdf_engine,
            docx,
            engine_wait,
        }
    }

    /// Production wiring: `lopdf` for PDF and the OOXML reader for DOCX.
    pub fn with_default_engines(engine_wait: Duration) -> Self {
        Self::new(PdfEngineHandle::lopdf(), Arc::new(OoxmlBackend), engine_wait)
    }

    pub fn pdf_engine(&self) -> &PdfEngineHandle {
        &self.pdf_engine
    }

    pub async fn extract(&self, source: ResolvedSource) -> Result<String, ExtractionFailure> {
        let started = std::time::Instant::now();
        let kind = DocumentKind::from_extension(&source.extension);

        let text = match kind {
            DocumentKind::Pdf => {
                let engine = match self.pdf_engine.ensure_ready(Some(self.engine_wait)).await {
                    Ok(engine) => engine,
                    Err(EngineError::NotReady(message)) => {
                        let status = self.pdf_engine.status().await;
                        warn!(target: "dispatcher", status = ?status, "PDF engine unavailable: {}", message);
                        return Err(ExtractionFailure::EngineNotReady(message));
                    }
                };

                let bytes = source.raw_bytes;
                let pages = tokio::task::spawn_blocking(move || engine.page_runs(&bytes))
                    .await
                    .map_err(|e| ExtractionFailure::Extraction(format!("PDF worker failed: {}", e)))?
                    .map_err(|e| ExtractionFailure::Extraction(format!("{:#}", e)))?;

                info!(target: "dispatcher", pages = pages.len(), "PDF pages extracted");
                render_pages(&pages)
            }
            DocumentKind::Docx => {
                let docx = Arc::clone(&self.docx);
                let bytes = source.raw_bytes;
                tokio::task::spawn_blocking(move || docx.raw_text(&bytes))
                    .await
                    .map_err(|e| ExtractionFailure::Extraction(format!("DOCX worker failed: {}", e)))?
                    .map_err(|e| ExtractionFailure::Extraction(format!("{:#}", e)))?
            }
            DocumentKind::Unsupported => {
                warn!(
                    target: "dispatcher",
                    filename = %source.filename,
                    extension = %source.extension,
                    ct = %source.content_type,
                    "Unsupported document type"
                );
                return Err(ExtractionFailure::UnsupportedType(UnsupportedTypeInfo {
                    filename: source.filename,
                    detected_extension: source.extension,
                    content_type: source.content_type,
                    final_url: source.final_url,
                }));
            }
        };

        info!(
            target: "dispatcher",
            kind = ?kind,
            len = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extraction succeeded"
        );
        Ok(text)
    }
}
