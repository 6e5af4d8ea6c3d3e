use serde::{Deserialize, Serialize};

/// A submitted menu document: raw bytes plus request metadata.
///
/// Created once at submission and never mutated afterwards. The pipeline
/// never interprets the bytes itself; that is delegated to the
/// `PdfTextExtractor` collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDocument {
    /// Original filename as supplied by the caller.
    pub filename: String,
    /// Raw document bytes.
    pub bytes: Vec<u8>,
    /// Size of the document in bytes, recorded at submission.
    pub size: usize,
    /// Optional free-form styling brief forwarded to the designer stage.
    pub design_brief: Option<String>,
}

impl MenuDocument {
    /// Wrap raw bytes and metadata into an immutable document.
    #[must_use]
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len();
        Self {
            filename: filename.into(),
            bytes,
            size,
            design_brief: None,
        }
    }

    /// Attach a styling brief for the designer stage.
    #[must_use]
    pub fn with_design_brief(mut self, brief: impl Into<String>) -> Self {
        self.design_brief = Some(brief.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_size_at_construction() {
        let doc = MenuDocument::new("menu.pdf", vec![1, 2, 3]);
        assert_eq!(doc.size, 3);
        assert!(!doc.is_empty());
        assert!(doc.design_brief.is_none());
    }

    #[test]
    fn survives_json_round_trip() {
        let doc =
            MenuDocument::new("menu.pdf", b"%PDF-1.7 fake".to_vec()).with_design_brief("warm, rustic");
        let json = serde_json::to_string(&doc).unwrap();
        let back: MenuDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back.bytes, doc.bytes);
        assert_eq!(back.design_brief.as_deref(), Some("warm, rustic"));
    }
}
