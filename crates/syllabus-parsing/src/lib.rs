use std::path::Path;

use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod finder;
pub mod linker;
pub mod patterns;
pub mod report;
pub mod scoring;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::{AssignmentExtractor, DocumentScan, ScoredAssignment};
pub use finder::{MatchFinder, Occurrence};
pub use linker::{COMBINED_SEPARATOR, link_page};
pub use patterns::PatternLibrary;
pub use report::{PotentialAssignment, PotentialSource, StructuredReport};
pub use scoring::{ConfidenceScorer, ScoringWeights};
// Re-export domain types from core (canonical definitions live there)
pub use syllabus_core::{
    BackendError, BoundingBox, Classification, ExtractionResult, Match, MatchType, PdfBackend,
};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("backend error: {0}")]
    Backend(#[from] syllabus_core::BackendError),
}

/// Extract assignments, dates, and linked pairs from a document.
///
/// Pipeline:
/// 1. Extract each page's text via `backend`
/// 2. Find assignment keywords and dates with context and position
/// 3. Optionally drop assignments scored below the default threshold
/// 4. Link each remaining assignment to a nearby date on its page
pub fn extract_assignments(
    path: &Path,
    backend: &dyn PdfBackend,
    filter_real: bool,
) -> Result<ExtractionResult, ParsingError> {
    AssignmentExtractor::new().extract(path, backend, filter_real)
}

/// Every assignment mention in a document with its confidence.
pub fn score_assignments(
    path: &Path,
    backend: &dyn PdfBackend,
) -> Result<Vec<ScoredAssignment>, ParsingError> {
    AssignmentExtractor::new().score_assignments(path, backend)
}

/// Extraction results regrouped by page, plus potential assignments.
pub fn structured_report(
    path: &Path,
    backend: &dyn PdfBackend,
    filter_real: bool,
) -> Result<StructuredReport, ParsingError> {
    AssignmentExtractor::new().structured_report(path, backend, filter_real)
}
