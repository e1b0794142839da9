use std::path::Path;

use serde::Serialize;
use syllabus_core::{
    BoundingBox, Classification, ExtractionResult, Match, PdfBackend, PdfDocument,
};

use crate::ParsingError;
use crate::config::ParsingConfig;
use crate::finder::{MatchFinder, Occurrence};
use crate::linker::link_page;
use crate::patterns::PatternLibrary;
use crate::report::{StructuredReport, build_report};
use crate::scoring::ConfidenceScorer;

/// One assignment with its confidence, as returned by
/// [`AssignmentExtractor::score_assignments`].
#[derive(Debug, Clone, Serialize)]
pub struct ScoredAssignment {
    pub text: String,
    pub page: usize,
    pub context: String,
    #[serde(flatten)]
    pub classification: Classification,
    pub position: BoundingBox,
}

/// Page texts and raw occurrences from one pass over a document.
#[derive(Debug, Clone, Default)]
pub struct DocumentScan {
    pub pages: Vec<String>,
    pub assignments: Vec<Occurrence>,
    pub dates: Vec<Occurrence>,
}

impl DocumentScan {
    fn date_records(&self) -> Vec<Match> {
        self.dates.iter().map(|o| o.record.clone()).collect()
    }
}

/// A configurable assignment extraction pipeline.
///
/// Holds a [`ParsingConfig`] and the [`PatternLibrary`] built from it. The
/// library is never mutated, so one extractor can serve many requests.
#[derive(Debug, Clone)]
pub struct AssignmentExtractor {
    config: ParsingConfig,
    patterns: PatternLibrary,
}

impl Default for AssignmentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParsingConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        let patterns = PatternLibrary::new(&config);
        Self { config, patterns }
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    pub fn scorer(&self) -> ConfidenceScorer<'_> {
        ConfidenceScorer::new(&self.patterns)
    }

    /// Classify an assignment match at the configured threshold.
    pub fn classify(&self, m: &Match, dates: &[Match]) -> Classification {
        self.scorer()
            .classify(m, Some(dates), self.config.assignment_threshold)
    }

    /// Keep only assignments classified as real.
    pub fn filter_real_assignments(&self, assignments: &[Match], dates: &[Match]) -> Vec<Match> {
        assignments
            .iter()
            .filter(|m| self.classify(m, dates).is_real)
            .cloned()
            .collect()
    }

    /// Read every page of an open document and collect raw occurrences.
    pub fn scan_document(&self, doc: &dyn PdfDocument) -> Result<DocumentScan, ParsingError> {
        let finder = MatchFinder::new(&self.patterns, self.config.context_window);
        let mut scan = DocumentScan::default();

        for index in 0..doc.page_count()? {
            let text = doc.page_text(index)?;
            let assignments = finder.assignments(doc, index, &text);
            let dates = finder.dates(doc, index, &text);
            tracing::debug!(
                page = index + 1,
                assignments = assignments.len(),
                dates = dates.len(),
                "scanned page"
            );
            scan.assignments.extend(assignments);
            scan.dates.extend(dates);
            scan.pages.push(text);
        }

        Ok(scan)
    }

    /// Open, scan, and close a document.
    pub fn scan(
        &self,
        path: &Path,
        backend: &dyn PdfBackend,
    ) -> Result<DocumentScan, ParsingError> {
        let doc = backend.open(path)?;
        // `doc` is dropped (closed) on return, including the error path.
        self.scan_document(doc.as_ref())
    }

    /// Link and assemble raw matches from a finished scan.
    pub fn extract_from_scan(&self, scan: DocumentScan, filter_real: bool) -> ExtractionResult {
        let date_records = scan.date_records();
        let assignments: Vec<Occurrence> = if filter_real {
            scan.assignments
                .into_iter()
                .filter(|o| self.classify(&o.record, &date_records).is_real)
                .collect()
        } else {
            scan.assignments
        };

        let mut combined = Vec::new();
        for (index, text) in scan.pages.iter().enumerate() {
            let page_number = index + 1;
            let page_assignments: Vec<Occurrence> = assignments
                .iter()
                .filter(|o| o.record.page_number == page_number)
                .cloned()
                .collect();
            let page_dates: Vec<Occurrence> = scan
                .dates
                .iter()
                .filter(|o| o.record.page_number == page_number)
                .cloned()
                .collect();
            combined.extend(link_page(
                text,
                page_number,
                &page_assignments,
                &page_dates,
                self.config.link_distance,
                self.config.context_window,
            ));
        }

        let result = ExtractionResult {
            assignments: assignments.into_iter().map(|o| o.record).collect(),
            dates: date_records,
            combined,
        };
        tracing::info!(
            pages = scan.pages.len(),
            assignments = result.assignments.len(),
            dates = result.dates.len(),
            combined = result.combined.len(),
            filter_real,
            "extraction complete"
        );
        result
    }

    /// Find assignment mentions, dates, and proximity-linked pairs.
    ///
    /// With `filter_real`, assignments below the configured threshold are
    /// dropped before linking, so they produce no combined matches either.
    pub fn extract(
        &self,
        path: &Path,
        backend: &dyn PdfBackend,
        filter_real: bool,
    ) -> Result<ExtractionResult, ParsingError> {
        let scan = self.scan(path, backend)?;
        Ok(self.extract_from_scan(scan, filter_real))
    }

    /// Every assignment mention with its confidence.
    pub fn score_assignments(
        &self,
        path: &Path,
        backend: &dyn PdfBackend,
    ) -> Result<Vec<ScoredAssignment>, ParsingError> {
        let scan = self.scan(path, backend)?;
        let dates = scan.date_records();
        Ok(scan
            .assignments
            .into_iter()
            .map(|o| {
                let classification = self.classify(&o.record, &dates);
                ScoredAssignment {
                    text: o.record.text,
                    page: o.record.page_number,
                    context: o.record.context,
                    classification,
                    position: o.record.position,
                }
            })
            .collect())
    }

    /// Raw matches plus page-grouped and potential-assignment views.
    pub fn structured_report(
        &self,
        path: &Path,
        backend: &dyn PdfBackend,
        filter_real: bool,
    ) -> Result<StructuredReport, ParsingError> {
        let raw = self.extract(path, backend, filter_real)?;
        let dates = raw.dates.clone();
        Ok(build_report(raw, |m| self.classify(m, &dates)))
    }
}
