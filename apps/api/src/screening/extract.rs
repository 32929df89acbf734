//! PDF Text Extractor: turns an uploaded resume into one plain-text string.
//!
//! Pages are walked in page order with `lopdf` and their text concatenated with
//! no separator. Pages that fail are skipped with a warning. When the page walk
//! recovers nothing (unusual font encodings, broken xref tables) the whole
//! document is retried through `pdf_extract`.
//!
//! Extraction is CPU-bound and `pdf_extract` can panic on malformed input, so
//! callers run `extract_pdf_text` inside `tokio::task::spawn_blocking`.

use lopdf::Document;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF";
const ENCRYPT_KEY: &[u8] = b"/Encrypt";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a PDF document")]
    NotPdf,

    #[error("unreadable PDF: {0}")]
    Unreadable(String),

    #[error("PDF is encrypted")]
    Encrypted,

    #[error("no text could be extracted")]
    NoText,

    #[error("extractor crashed: {0}")]
    Panicked(String),
}

type Fallback = fn(&[u8]) -> Result<String, ExtractError>;

/// Extracts and concatenates the text of every page of `bytes`.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    extract_with_fallback(bytes, whole_document_text)
}

fn extract_with_fallback(bytes: &[u8], fallback: Fallback) -> Result<String, ExtractError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ExtractError::NotPdf);
    }

    match extract_by_pages(bytes) {
        Ok(text) if !text.trim().is_empty() => return Ok(text),
        Ok(_) => debug!("Page walk produced no text, falling back to whole-document extraction"),
        Err(ExtractError::Encrypted) => return Err(ExtractError::Encrypted),
        Err(e) => debug!("Page walk failed ({e}), falling back to whole-document extraction"),
    }

    fallback(bytes)
}

fn whole_document_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Unreadable(e.to_string()))?;
    if text.trim().is_empty() {
        return Err(ExtractError::NoText);
    }
    Ok(text)
}

fn extract_by_pages(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        // lopdf refuses some encrypted files outright
        Err(_) if declares_encryption(bytes) => return Err(ExtractError::Encrypted),
        Err(e) => return Err(ExtractError::Unreadable(e.to_string())),
    };
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(ExtractError::Encrypted);
    }

    let mut text = String::new();
    // get_pages() is a BTreeMap keyed by page number, so iteration is page order.
    for page_number in doc.get_pages().keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!("Failed to extract text from page {page_number}: {e}"),
        }
    }
    Ok(text)
}

fn declares_encryption(bytes: &[u8]) -> bool {
    bytes
        .windows(ENCRYPT_KEY.len())
        .any(|window| window == ENCRYPT_KEY)
}

/// Describes a panic payload caught from the blocking extraction task.
pub fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
