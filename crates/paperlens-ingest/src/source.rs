//! PDF acquisition: uploaded bytes, a remote URL, or a local path.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use paperlens_core::{Error, Result};

/// Largest accepted PDF, uploaded or downloaded.
pub const MAX_PDF_BYTES: usize = 64 * 1024 * 1024;

/// Where the PDF bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfSource {
    Bytes(Vec<u8>),
    Url(String),
    Path(PathBuf),
}

impl PdfSource {
    /// Pick the source from form input. Uploaded bytes win over a URL.
    pub fn select(upload: Option<Vec<u8>>, url: Option<String>) -> Result<Self> {
        if let Some(bytes) = upload.filter(|b| !b.is_empty()) {
            return Ok(Self::Bytes(bytes));
        }
        match url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) {
            Some(url) => Ok(Self::Url(url)),
            None => Err(Error::InvalidInput(
                "upload a PDF file or provide a PDF URL".into(),
            )),
        }
    }

    /// Interpret a command-line argument as a URL or a file path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::Path(PathBuf::from(arg))
        }
    }

    /// Resolve the source to raw bytes.
    pub async fn load(self, client: &Client) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Url(url) => fetch_pdf(client, &url).await,
            Self::Path(path) => {
                let bytes = tokio::fs::read(&path).await?;
                info!("Read {} ({} bytes)", path.display(), bytes.len());
                Ok(bytes)
            }
        }
    }
}

/// Build the HTTP client used for PDF downloads.
pub fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))
}

/// GET a PDF. Any non-2xx status is a failure.
pub async fn fetch_pdf(client: &Client, url: &str) -> Result<Vec<u8>> {
    fetch_pdf_limited(client, url, MAX_PDF_BYTES).await
}

/// Download `url`, failing once the body exceeds `max_bytes`.
pub async fn fetch_pdf_limited(client: &Client, url: &str, max_bytes: usize) -> Result<Vec<u8>> {
    debug!("Fetching PDF from {}", url);

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Fetch(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Fetch(format!("{} returned HTTP {}", url, status)));
    }

    let too_large = || Error::Fetch(format!("{} is larger than {} bytes", url, max_bytes));
    if response.content_length().is_some_and(|len| len > max_bytes as u64) {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::Fetch(format!("reading body from {} failed: {}", url, e)))?
    {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }

    info!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes)
}

/// SHA-256 of the document bytes, hex encoded.
pub fn document_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
