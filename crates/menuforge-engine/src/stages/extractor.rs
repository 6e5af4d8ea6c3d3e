use crate::stage::Stage;
use async_trait::async_trait;
use menuforge_model::{ExtractedText, MenuDocument, StageId};
use menuforge_pdf::{ExtractionError, PdfTextExtractor};
use std::sync::Arc;
use tracing::info;

/// First stage: raw text retrieval.
///
/// Delegates entirely to the `PdfTextExtractor` collaborator and performs
/// no structural interpretation of the text.
pub struct Extractor {
    backend: Arc<dyn PdfTextExtractor>,
}

impl Extractor {
    #[must_use]
    pub fn new(backend: Arc<dyn PdfTextExtractor>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Stage for Extractor {
    type Input = MenuDocument;
    type Output = ExtractedText;
    type Error = ExtractionError;

    fn id(&self) -> StageId {
        StageId::Extracting
    }

    async fn run(&self, document: MenuDocument) -> Result<ExtractedText, ExtractionError> {
        let text = self.backend.extract(&document.bytes).await?;
        if text.is_empty() {
            return Err(ExtractionError::EmptyDocument);
        }
        info!(
            filename = %document.filename,
            bytes = document.size,
            pages = text.blocks.len(),
            "extracted document text"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use menuforge_model::TextBlock;

    struct BlankExtractor;

    #[async_trait]
    impl PdfTextExtractor for BlankExtractor {
        async fn extract(&self, _bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
            Ok(ExtractedText::new(vec![TextBlock {
                page: 1,
                text: "   ".into(),
            }]))
        }
    }

    #[tokio::test]
    async fn blank_collaborator_output_is_an_empty_document() {
        let stage = Extractor::new(Arc::new(BlankExtractor));
        let doc = MenuDocument::new("menu.txt", b"whatever".to_vec());
        assert!(matches!(
            stage.run(doc).await,
            Err(ExtractionError::EmptyDocument)
        ));
    }

    #[tokio::test]
    async fn passes_collaborator_text_through() {
        let stage = Extractor::new(Arc::new(menuforge_pdf::PlainTextExtractor));
        let doc = MenuDocument::new("menu.txt", b"STARTERS\nSoup 5.00".to_vec());
        let text = stage.run(doc).await.unwrap();
        assert_eq!(text.blocks.len(), 1);
        assert!(text.full_text().contains("Soup"));
    }
}
