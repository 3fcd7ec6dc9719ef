//! Error types for PaperLens.
//!
//! Only the fatal conditions of a run are represented here. Per-chunk model
//! failures, merge failures and summary failures are degraded in place by the
//! extraction pipeline and never surface as an `Error`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("No extractable text found: the PDF might be scanned or image-based")]
    NoText,

    #[error("Failed to fetch PDF: {0}")]
    Fetch(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
