// PDF text collaborator. The document model comes from `lopdf`; this module
// only walks pages in order and flattens their text runs.

use anyhow::Context;
use lopdf::Document;

/// A loaded PDF engine able to turn document bytes into per-page text runs.
pub trait PdfBackend: Send + Sync {
    /// Text runs of every page, pages in document order (1-based), runs in
    /// content-stream order.
    fn page_runs(&self, bytes: &[u8]) -> anyhow::Result<Vec<Vec<String>>>;
}

/// `lopdf`-backed engine.
#[derive(Debug, Default)]
pub struct LopdfBackend;

impl PdfBackend for LopdfBackend {
    fn page_runs(&self, bytes: &[u8]) -> anyhow::Result<Vec<Vec<String>>> {
        let doc = Document::load_mem(bytes).context("failed to load PDF document from bytes")?;

        // `get_pages` is keyed by 1-based page number in ascending order.
        let mut pages = Vec::new();
        for (page_number, _object_id) in doc.get_pages() {
            let text = doc
                .extract_text(&[page_number])
                .with_context(|| format!("failed to extract text from page {}", page_number))?;
            let runs = text
                .lines()
                .map(str::trim)
                .filter(|run| !run.is_empty())
                .map(str::to_string)
                .collect();
            pages.push(runs);
        }
        Ok(pages)
    }
}

/// Joins each page's runs with a single space and ends every page with a newline.
pub fn render_pages(pages: &[Vec<String>]) -> String {
    let mut out = String::new();
    for runs in pages {
        out.push_str(&runs.join(" "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Builds an in-memory PDF with one Helvetica text line per page.
    pub(crate) fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content encodes"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("pdf serializes");
        bytes
    }

    #[test]
    fn render_joins_runs_and_terminates_pages() {
        let pages = vec![
            vec!["Hello".to_string(), "world".to_string()],
            vec![],
            vec!["Last".to_string()],
        ];
        assert_eq!(render_pages(&pages), "Hello world\n\nLast\n");
    }

    #[test]
    fn lopdf_reads_pages_in_order() {
        let bytes = build_pdf(&["First page", "Second page", "Third page"]);
        let pages = LopdfBackend.page_runs(&bytes).expect("pdf parses");
        assert_eq!(pages.len(), 3);

        let text = render_pages(&pages);
        let segments: Vec<&str> = text.lines().collect();
        assert_eq!(segments.len(), 3);
        assert!(segments[0].contains("First"));
        assert!(segments[1].contains("Second"));
        assert!(segments[2].contains("Third"));
    }

    #[test]
    fn malformed_pdf_is_an_error() {
        let err = LopdfBackend
            .page_runs(b"definitely not a pdf")
            .unwrap_err();
        assert!(format!("{:#}", err).contains("failed to load PDF"));
    }
}
