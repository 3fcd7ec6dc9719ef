//! PaperLens Ingest: PDF acquisition, per-page text extraction, page chunking.

pub mod chunking;
pub mod pdf;
pub mod source;

pub use chunking::{Chunk, PageChunker, PAGE_SEPARATOR};
pub use pdf::{extract_pages, has_text, normalize_page_text, Page};
pub use source::{
    document_fingerprint, fetch_pdf, fetch_pdf_limited, http_client, PdfSource, MAX_PDF_BYTES,
};
