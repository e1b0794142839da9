use std::ops::Range;

use regex::Regex;
use syllabus_core::{BoundingBox, Match, MatchType, PdfDocument};

use crate::patterns::PatternLibrary;

/// A [`Match`] together with where it sits in its page's text.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub record: Match,
    /// Byte range of the match within the page text.
    pub span: Range<usize>,
}

/// Text around `start..end`, widened by `radius` characters on each side,
/// clamped to the page and trimmed.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> String {
    let lo = if radius == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map_or(0, |(i, _)| i)
    };
    let hi = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    text[lo..hi].trim().to_string()
}

/// Character (not byte) offset of `byte` within `text`.
pub fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Scans page text for assignment keywords and dates.
#[derive(Debug, Clone, Copy)]
pub struct MatchFinder<'a> {
    patterns: &'a PatternLibrary,
    context_window: usize,
}

impl<'a> MatchFinder<'a> {
    pub fn new(patterns: &'a PatternLibrary, context_window: usize) -> Self {
        Self {
            patterns,
            context_window,
        }
    }

    /// Assignment keyword occurrences on one page (0-indexed), in text order.
    pub fn assignments(
        &self,
        doc: &dyn PdfDocument,
        page_index: usize,
        text: &str,
    ) -> Vec<Occurrence> {
        self.scan(
            self.patterns.assignment_pattern(),
            MatchType::Assignment,
            doc,
            page_index,
            text,
        )
    }

    /// Date occurrences on one page (0-indexed), in text order.
    pub fn dates(
        &self,
        doc: &dyn PdfDocument,
        page_index: usize,
        text: &str,
    ) -> Vec<Occurrence> {
        self.scan(
            self.patterns.date_pattern(),
            MatchType::Date,
            doc,
            page_index,
            text,
        )
    }

    fn scan(
        &self,
        re: &Regex,
        match_type: MatchType,
        doc: &dyn PdfDocument,
        page_index: usize,
        text: &str,
    ) -> Vec<Occurrence> {
        re.find_iter(text)
            .map(|m| Occurrence {
                record: Match {
                    text: m.as_str().to_string(),
                    page_number: page_index + 1,
                    context: context_window(text, m.start(), m.end(), self.context_window),
                    match_type,
                    position: locate(doc, page_index, m.as_str()),
                },
                span: m.range(),
            })
            .collect()
    }
}

/// Bounding box of the first hit, or the sentinel when the lookup misses or fails.
fn locate(doc: &dyn PdfDocument, page_index: usize, needle: &str) -> BoundingBox {
    match doc.find_text_bbox(page_index, needle) {
        Ok(Some(bbox)) => bbox,
        Ok(None) => {
            tracing::debug!(page = page_index + 1, text = needle, "spatial lookup missed");
            BoundingBox::SENTINEL
        }
        Err(e) => {
            tracing::debug!(
                page = page_index + 1,
                text = needle,
                error = %e,
                "spatial lookup failed"
            );
            BoundingBox::SENTINEL
        }
    }
}
