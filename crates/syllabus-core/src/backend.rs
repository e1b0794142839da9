use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::BoundingBox;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document {}: {message}", path.display())]
    Open { path: PathBuf, message: String },
    #[error("failed to extract text: {0}")]
    Extraction(String),
    #[error("spatial lookup failed: {0}")]
    SpatialLookup(String),
}

impl BackendError {
    pub fn open(path: &Path, message: impl Into<String>) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Trait for document text extraction backends.
///
/// Implementors only open documents; matching and scoring live in
/// `syllabus_parsing::AssignmentExtractor`.
pub trait PdfBackend: Send + Sync {
    /// Open a document for scanning.
    ///
    /// The returned handle is closed when dropped.
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError>;
}

/// An open document.
pub trait PdfDocument {
    fn page_count(&self) -> Result<usize, BackendError>;

    /// Plain text of one page (0-indexed).
    fn page_text(&self, index: usize) -> Result<String, BackendError>;

    /// Bounding box of the first occurrence of `needle` on a page (0-indexed).
    ///
    /// `Ok(None)` when the text is not on the page.
    fn find_text_bbox(
        &self,
        index: usize,
        needle: &str,
    ) -> Result<Option<BoundingBox>, BackendError>;
}
