//! PDF text extraction using lopdf and pdf-extract.

use lopdf::{Document, Object};
use tracing::debug;

use super::{PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// PDF content extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Text content of a loaded PDF.
#[derive(Debug, Clone)]
pub struct PdfContent {
    /// Type of PDF content.
    pub pdf_type: PdfType,
    /// Extracted text, empty for scanned documents.
    pub text: String,
    /// Number of pages.
    pub page_count: u32,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF and pull out its text in one step.
    pub fn read(data: &[u8], min_text_length: usize) -> Result<PdfContent> {
        let mut extractor = Self::new();
        extractor.load(data)?;

        let text = extractor.extract_text().unwrap_or_default();
        let pdf_type = extractor.classify(&text, min_text_length);

        Ok(PdfContent {
            pdf_type,
            text,
            page_count: extractor.page_count(),
        })
    }

    fn classify(&self, text: &str, min_text_length: usize) -> PdfType {
        let text_len = text.trim().len();
        let images = self.image_count();

        let pdf_type = if text_len >= min_text_length {
            PdfType::Text
        } else if images > 0 {
            PdfType::Scanned
        } else {
            PdfType::Empty
        };

        debug!(text_len, images, ?pdf_type, "PDF analysis");
        pdf_type
    }

    /// Number of image XObjects in the document.
    fn image_count(&self) -> usize {
        let Some(doc) = self.document.as_ref() else {
            return 0;
        };

        doc.objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .is_ok_and(|name| name == b"Image"),
                _ => false,
            })
            .count()
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self, min_text_length: usize) -> PdfType {
        let text = self.extract_text().unwrap_or_default();
        self.classify(&text, min_text_length)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert_eq!(extractor.analyze(50), PdfType::Empty);
    }

    #[test]
    fn test_extract_text_requires_document() {
        assert!(matches!(
            PdfExtractor::new().extract_text(),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(matches!(
            PdfExtractor::read(b"not a pdf", 50),
            Err(PdfError::Parse(_))
        ));
    }
}
