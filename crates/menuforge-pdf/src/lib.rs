//! Document text extraction seam
//!
//! The pipeline never parses document bytes itself; it talks to a
//! [`PdfTextExtractor`] collaborator that turns raw bytes into ordered
//! page-wise text blocks. Production deployments plug in a real PDF
//! backend; [`PlainTextExtractor`] covers tests, dry runs and plain-text
//! menus.

use async_trait::async_trait;
use menuforge_model::{ExtractedText, TextBlock};
use thiserror::Error;
use tracing::debug;

/// Failures reported by a text extraction collaborator.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("document is unreadable: {0}")]
    Unreadable(String),

    #[error("document is encrypted")]
    Encrypted,

    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("extraction collaborator failed: {0}")]
    Collaborator(String),
}

/// Raw text retrieval from submitted document bytes.
///
/// Implementations must be safe under concurrent use; one extractor is
/// shared across workflow instances.
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    /// Extract ordered text blocks from the document bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError`] for unreadable, encrypted or empty
    /// documents.
    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

/// Extractor for UTF-8 plain-text documents.
///
/// Pages are split on form feeds (`\x0c`), matching how text dumps of
/// paginated menus usually arrive. PDF bytes are recognized and rejected:
/// encrypted documents explicitly, other PDFs as unreadable, since this
/// extractor has no PDF decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl PdfTextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        if bytes.starts_with(b"%PDF") {
            if contains_subslice(bytes, b"/Encrypt") {
                return Err(ExtractionError::Encrypted);
            }
            return Err(ExtractionError::Unreadable(
                "binary PDF payload; plain-text extractor cannot decode it".into(),
            ));
        }

        let text = std::str::from_utf8(bytes)
            .map_err(|e| ExtractionError::Unreadable(format!("invalid UTF-8 at byte {}", e.valid_up_to())))?;

        let blocks: Vec<TextBlock> = text
            .split('\u{0c}')
            .enumerate()
            .filter(|(_, page)| !page.trim().is_empty())
            .map(|(idx, page)| TextBlock {
                page: idx as u32 + 1,
                text: page.trim().to_string(),
            })
            .collect();

        if blocks.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }

        debug!(pages = blocks.len(), "extracted plain-text document");
        Ok(ExtractedText::new(blocks))
    }
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_pages_on_form_feed() {
        let text = PlainTextExtractor
            .extract("STARTERS\nSoup 5.00\u{0c}MAINS\nSteak 19.00".as_bytes())
            .await
            .unwrap();
        assert_eq!(text.blocks.len(), 2);
        assert_eq!(text.blocks[0].page, 1);
        assert_eq!(text.blocks[1].page, 2);
        assert!(text.blocks[1].text.contains("Steak"));
    }

    #[tokio::test]
    async fn empty_document_is_rejected() {
        assert!(matches!(
            PlainTextExtractor.extract(b"").await,
            Err(ExtractionError::EmptyDocument)
        ));
        assert!(matches!(
            PlainTextExtractor.extract(b"  \n \x0c ").await,
            Err(ExtractionError::EmptyDocument)
        ));
    }

    #[tokio::test]
    async fn encrypted_pdf_is_recognized() {
        let bytes = b"%PDF-1.7 stuff /Encrypt 12 0 R more".to_vec();
        assert!(matches!(
            PlainTextExtractor.extract(&bytes).await,
            Err(ExtractionError::Encrypted)
        ));
    }

    #[tokio::test]
    async fn plain_pdf_is_unreadable_for_this_extractor() {
        assert!(matches!(
            PlainTextExtractor.extract(b"%PDF-1.4 binary").await,
            Err(ExtractionError::Unreadable(_))
        ));
    }

    #[tokio::test]
    async fn invalid_utf8_is_unreadable() {
        assert!(matches!(
            PlainTextExtractor.extract(&[0x4d, 0xff, 0xfe]).await,
            Err(ExtractionError::Unreadable(_))
        ));
    }
}
