use std::path::Path;

use mupdf::{Document, Page, Quad, TextPageFlags};

use syllabus_core::{BackendError, BoundingBox, PdfBackend, PdfDocument};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate is the sole AGPL island. It isolates the mupdf dependency
/// (which is AGPL-3.0) so that plain-text code paths do not transitively
/// depend on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::open(path, "invalid path encoding"))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::open(path, e.to_string()))?;
        tracing::debug!(path = %path.display(), "opened PDF");

        Ok(Box::new(MupdfDocument { document }))
    }
}

/// An open MuPDF document. Closed when dropped.
pub struct MupdfDocument {
    document: Document,
}

impl MupdfDocument {
    fn load(&self, index: usize) -> Result<Page, BackendError> {
        let index = i32::try_from(index)
            .map_err(|_| BackendError::Extraction(format!("page index {index} too large")))?;
        self.document
            .load_page(index)
            .map_err(|e| BackendError::Extraction(e.to_string()))
    }
}

impl PdfDocument for MupdfDocument {
    fn page_count(&self) -> Result<usize, BackendError> {
        let count = self
            .document
            .page_count()
            .map_err(|e| BackendError::Extraction(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn page_text(&self, index: usize) -> Result<String, BackendError> {
        let page = self.load(index)?;
        let text_page = page
            .to_text_page(TextPageFlags::empty())
            .map_err(|e| BackendError::Extraction(e.to_string()))?;

        // Use block/line iteration to match PyMuPDF's get_text() behavior
        let mut page_text = String::new();
        for block in text_page.blocks() {
            for line in block.lines() {
                let line_text: String = line
                    .chars()
                    .map(|c| c.char().unwrap_or('\u{FFFD}'))
                    .collect();
                page_text.push_str(&line_text);
                page_text.push('\n');
            }
        }
        Ok(page_text)
    }

    fn find_text_bbox(
        &self,
        index: usize,
        needle: &str,
    ) -> Result<Option<BoundingBox>, BackendError> {
        let page = self.load(index)?;
        let hits = page
            .search(needle, 1)
            .map_err(|e| BackendError::SpatialLookup(e.to_string()))?;
        Ok(hits.into_iter().next().map(|quad| quad_bounds(&quad)))
    }
}

/// Axis-aligned box enclosing a (possibly rotated) quad.
fn quad_bounds(quad: &Quad) -> BoundingBox {
    let xs = [quad.ul.x, quad.ur.x, quad.ll.x, quad.lr.x];
    let ys = [quad.ul.y, quad.ur.y, quad.ll.y, quad.lr.y];
    BoundingBox::new(
        xs.into_iter().fold(f32::INFINITY, f32::min),
        ys.into_iter().fold(f32::INFINITY, f32::min),
        xs.into_iter().fold(f32::NEG_INFINITY, f32::max),
        ys.into_iter().fold(f32::NEG_INFINITY, f32::max),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mupdf::Point;

    #[test]
    fn test_quad_bounds_axis_aligned() {
        let quad = Quad {
            ul: Point { x: 10.0, y: 20.0 },
            ur: Point { x: 50.0, y: 20.0 },
            ll: Point { x: 10.0, y: 32.0 },
            lr: Point { x: 50.0, y: 32.0 },
        };
        let bbox = quad_bounds(&quad);
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 50.0, 32.0));
    }

    #[test]
    fn test_quad_bounds_rotated() {
        let quad = Quad {
            ul: Point { x: 5.0, y: 0.0 },
            ur: Point { x: 10.0, y: 5.0 },
            ll: Point { x: 0.0, y: 5.0 },
            lr: Point { x: 5.0, y: 10.0 },
        };
        assert_eq!(quad_bounds(&quad), BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pdf");
        let err = MupdfBackend::new().open(&missing).err().unwrap();
        assert!(matches!(err, BackendError::Open { .. }), "{err}");
        assert!(err.to_string().contains("missing.pdf"));
    }
}
