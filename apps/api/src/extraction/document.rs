//! Binary document to text.
//!
//! `DocumentExtractor` is the seam; `PdfTextExtractor` is the production
//! implementation over `pdf-extract`. Text extraction is CPU-bound and runs
//! inside `tokio::task::spawn_blocking`.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;

/// Per-page UTF-8 text, in page order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocumentText {
    pub pages: Vec<String>,
}

impl RawDocumentText {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            pages: vec![text.into()],
        }
    }

    /// Pages joined with a newline.
    pub fn joined(&self) -> String {
        self.pages.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, bytes: Bytes) -> Result<RawDocumentText, AppError>;
}

#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Bytes) -> Result<RawDocumentText, AppError> {
        if bytes.is_empty() {
            return Err(AppError::DocumentExtraction("document is empty".to_string()));
        }

        let size = bytes.len();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                // pdf-extract panics on some malformed files.
                warn!(error = %e, "pdf extraction task aborted");
                AppError::DocumentExtraction("the document could not be parsed".to_string())
            })?
            .map_err(|e| {
                warn!(error = %e, "pdf text extraction failed");
                AppError::DocumentExtraction(e.to_string())
            })?;

        let document = split_pages(&text);
        debug!(size, pages = document.pages.len(), "pdf text extracted");
        Ok(document)
    }
}

/// pdf-extract separates pages with a form feed.
fn split_pages(text: &str) -> RawDocumentText {
    let pages: Vec<String> = text
        .split('\u{c}')
        .map(String::from)
        .filter(|p| !p.trim().is_empty())
        .collect();
    RawDocumentText { pages }
}
