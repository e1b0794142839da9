use std::path::Path;

use thiserror::Error;

use syllabus_core::{PdfBackend, TextFileBackend};
use syllabus_parsing::{AssignmentExtractor, ScoredAssignment, StructuredReport};

// Re-export domain types for convenience
pub use syllabus_core::{ExtractionResult, Match, MatchType};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("extraction error: {0}")]
    Parsing(#[from] syllabus_parsing::ParsingError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of syllabus-ingest)")]
    NoPdfSupport,
}

/// Pick a document backend based on file extension:
/// - `.txt` → plain text, pages split on form feeds
/// - anything else → PDF (requires `pdf` feature / mupdf)
pub fn backend_for(path: &Path) -> Result<Box<dyn PdfBackend>, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let backend: Box<dyn PdfBackend> = match ext.as_str() {
        "txt" => Box::new(TextFileBackend),
        _ => pdf_backend()?,
    };
    tracing::debug!(path = %path.display(), ext = %ext, "selected backend");
    Ok(backend)
}

#[cfg(feature = "pdf")]
fn pdf_backend() -> Result<Box<dyn PdfBackend>, IngestError> {
    Ok(Box::new(syllabus_pdf_mupdf::MupdfBackend::new()))
}

#[cfg(not(feature = "pdf"))]
fn pdf_backend() -> Result<Box<dyn PdfBackend>, IngestError> {
    Err(IngestError::NoPdfSupport)
}

/// Extract assignments, dates, and linked pairs from a PDF or text file.
pub fn extract_assignments(
    path: &Path,
    extractor: &AssignmentExtractor,
    filter_real: bool,
) -> Result<ExtractionResult, IngestError> {
    let backend = backend_for(path)?;
    Ok(extractor.extract(path, backend.as_ref(), filter_real)?)
}

/// Score every assignment mention in a PDF or text file.
pub fn score_assignments(
    path: &Path,
    extractor: &AssignmentExtractor,
) -> Result<Vec<ScoredAssignment>, IngestError> {
    let backend = backend_for(path)?;
    Ok(extractor.score_assignments(path, backend.as_ref())?)
}

/// Build the page-grouped report for a PDF or text file.
pub fn structured_report(
    path: &Path,
    extractor: &AssignmentExtractor,
    filter_real: bool,
) -> Result<StructuredReport, IngestError> {
    let backend = backend_for(path)?;
    Ok(extractor.structured_report(path, backend.as_ref(), filter_real)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_text_file_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus.TXT");
        fs::write(&path, "Project proposal due 2026-03-01\n").unwrap();

        let result = extract_assignments(&path, &AssignmentExtractor::new(), false).unwrap();
        let texts: Vec<_> = result.assignments.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Project", "due"]);
        assert_eq!(result.combined.len(), 2);
    }

    #[test]
    fn test_missing_text_file_surfaces_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let err = score_assignments(&path, &AssignmentExtractor::new()).unwrap_err();
        assert!(err.to_string().contains("gone.txt"), "{err}");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_missing_pdf_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.pdf");
        let err = structured_report(&path, &AssignmentExtractor::new(), false).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Parsing(syllabus_parsing::ParsingError::Backend(
                syllabus_core::BackendError::Open { .. }
            ))
        ));
    }

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn test_pdf_without_feature() {
        let err = backend_for(Path::new("a.pdf")).err().unwrap();
        assert!(matches!(err, IngestError::NoPdfSupport));
    }
}
