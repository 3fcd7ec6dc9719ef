//! Per-page text extraction from PDF bytes.

use lopdf::Document;
use serde::Serialize;
use tracing::{debug, warn};

use paperlens_core::{Error, Result};

/// One physical page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based position in the document.
    pub number: u32,
    /// Whitespace-normalized text, blank lines removed.
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }

    /// Length in characters (not bytes).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Extract the text of every page.
///
/// Fails only when the bytes cannot be opened as a PDF. A page whose text
/// cannot be extracted becomes an empty page instead of aborting the document.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<Page>> {
    let document = Document::load_mem(bytes)
        .map_err(|e| Error::Pdf(format!("cannot open document: {}", e)))?;

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    let mut pages = Vec::with_capacity(page_numbers.len());

    for (index, page_number) in page_numbers.iter().enumerate() {
        let text = match document.extract_text(&[*page_number]) {
            Ok(raw) => normalize_page_text(&raw),
            Err(e) => {
                warn!("Text extraction failed on page {}: {}", page_number, e);
                String::new()
            }
        };
        pages.push(Page::new(index as u32 + 1, text));
    }

    debug!(
        "Extracted {} pages ({} with text)",
        pages.len(),
        pages.iter().filter(|p| !p.text.is_empty()).count()
    );

    Ok(pages)
}

/// Strip every line, drop empty lines, rejoin with single newlines.
pub fn normalize_page_text(raw: &str) -> String {
    raw.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether any page carries non-whitespace text.
pub fn has_text(pages: &[Page]) -> bool {
    pages.iter().any(|p| !p.text.trim().is_empty())
}

/// Build small text-only PDFs for tests.
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// One PDF page per entry; each entry is a list of text lines.
    pub fn text_pdf(pages: &[&[&str]]) -> Vec<u8> {
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
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                let y = 750 - (i as i64) * 20;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![72.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let encoded = content.encode().unwrap_or_default();
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap_or_default();
        buf
    }
}
