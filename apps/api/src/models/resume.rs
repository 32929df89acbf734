use std::path::Path;

use bytes::Bytes;

/// A resume awaiting screening: its display name and raw PDF bytes.
///
/// Read once, converted to text, then dropped with the batch.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ResumeDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }
}

/// True when `name` carries a `.pdf` extension, ignoring case.
pub fn has_pdf_extension(name: impl AsRef<Path>) -> bool {
    name.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_detection() {
        assert!(has_pdf_extension("cv.pdf"));
        assert!(has_pdf_extension("folder/CV.PDF"));
        assert!(!has_pdf_extension("cv.docx"));
        assert!(!has_pdf_extension("pdf"));
        assert!(!has_pdf_extension("notes.pdf.txt"));
    }
}
