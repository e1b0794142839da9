//! Backends that serve documents from memory or plain-text files.
//!
//! Spatial lookups on these documents use a monospace grid: every character
//! is [`CHAR_WIDTH`] wide and every line [`LINE_HEIGHT`] tall.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{BackendError, BoundingBox, PdfBackend, PdfDocument};

pub const CHAR_WIDTH: f32 = 6.0;
pub const LINE_HEIGHT: f32 = 12.0;

/// Page separator used by `pdftotext` and friends.
const FORM_FEED: char = '\x0c';

/// A document held entirely in memory, one string per page.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<String>,
}

impl MemoryDocument {
    pub fn new<S: Into<String>>(pages: impl IntoIterator<Item = S>) -> Self {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
        }
    }

    /// Split `text` into pages on form feeds. A trailing empty page is dropped.
    pub fn from_text(text: &str) -> Self {
        let mut pages: Vec<String> = text.split(FORM_FEED).map(str::to_string).collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Self { pages }
    }

    fn page(&self, index: usize) -> Result<&str, BackendError> {
        self.pages.get(index).map(String::as_str).ok_or_else(|| {
            BackendError::Extraction(format!(
                "page index {} out of range ({} pages)",
                index,
                self.pages.len()
            ))
        })
    }
}

impl PdfDocument for MemoryDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        Ok(self.pages.len())
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        self.page(index).map(str::to_string)
    }

    fn find_text_bbox(
        &self,
        index: usize,
        needle: &str,
    ) -> Result<Option<BoundingBox>, BackendError> {
        let text = self
            .page(index)
            .map_err(|e| BackendError::SpatialLookup(e.to_string()))?;
        if needle.is_empty() {
            return Ok(None);
        }
        Ok(text.find(needle).map(|at| grid_box(text, at, needle)))
    }
}

fn grid_box(text: &str, at: usize, needle: &str) -> BoundingBox {
    let before = &text[..at];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = text[line_start..at].chars().count();
    let width = needle.chars().count();

    let x0 = column as f32 * CHAR_WIDTH;
    let y0 = line as f32 * LINE_HEIGHT;
    BoundingBox::new(x0, y0, x0 + width as f32 * CHAR_WIDTH, y0 + LINE_HEIGHT)
}

/// Serves registered in-memory documents by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: HashMap<PathBuf, MemoryDocument>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<PathBuf>, document: MemoryDocument) -> Self {
        self.insert(path, document);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, document: MemoryDocument) {
        self.documents.insert(path.into(), document);
    }
}

impl PdfBackend for MemoryBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        self.documents
            .get(path)
            .cloned()
            .map(|d| Box::new(d) as Box<dyn PdfDocument>)
            .ok_or_else(|| BackendError::open(path, "no such document"))
    }
}

/// Reads UTF-8 text files, treating form feeds as page breaks.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileBackend;

impl PdfBackend for TextFileBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| BackendError::open(path, e.to_string()))?;
        Ok(Box::new(MemoryDocument::from_text(&text)))
    }
}
