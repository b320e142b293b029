use std::io::{Cursor, Read};

use anyhow::{anyhow, Context};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

const DOCUMENT_PART: &str = "word/document.xml";

/// DOCX-to-plain-text collaborator.
pub trait DocxBackend: Send + Sync {
    fn raw_text(&self, bytes: &[u8]) -> anyhow::Result<String>;
}

/// Reads the main document part straight out of the OOXML package.
/// Each `<w:p>` becomes one line; `<w:tab/>` and `<w:br/>` keep their layout.
#[derive(Debug, Default)]
pub struct OoxmlBackend;

impl DocxBackend for OoxmlBackend {
    fn raw_text(&self, bytes: &[u8]) -> anyhow::Result<String> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).context("failed to open DOCX archive")?;

        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_PART)
            .with_context(|| format!("DOCX package has no {}", DOCUMENT_PART))?
            .read_to_string(&mut xml)
            .context("failed to read DOCX document part")?;

        document_text(&xml)
    }
}

/// Collects the text runs of a WordprocessingML body.
fn document_text(xml: &str) -> anyhow::Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut output = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text = true,
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" | b"w:cr" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                output.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) if in_text => {
                if let Some(c) = entity_char(e.as_ref()) {
                    output.push(c);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(anyhow!(
                    "malformed DOCX XML at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(output)
}

/// Resolves the predefined XML entities and numeric character references.
fn entity_char(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x', hex @ ..] | [b'#', b'X', hex @ ..] => std::str::from_utf8(hex)
            .ok()
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .and_then(char::from_u32),
        [b'#', dec @ ..] => std::str::from_utf8(dec)
            .ok()
            .and_then(|d| d.parse::<u32>().ok())
            .and_then(char::from_u32),
        _ => None,
    }
}
