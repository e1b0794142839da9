//! Page-grouped and potential-assignment views over one extraction result.

use std::collections::BTreeMap;

use serde::Serialize;
use syllabus_core::{BoundingBox, Classification, ExtractionResult, Match};

use crate::linker::assignment_part;

/// A match without classification.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub text: String,
    pub context: String,
    pub position: BoundingBox,
}

impl From<&Match> for MatchSummary {
    fn from(m: &Match) -> Self {
        Self {
            text: m.text.clone(),
            context: m.context.clone(),
            position: m.position,
        }
    }
}

/// An assignment match with its classification.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredMatch {
    pub text: String,
    pub context: String,
    pub position: BoundingBox,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Everything found on one page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageMatches {
    pub assignments: Vec<ScoredMatch>,
    pub dates: Vec<MatchSummary>,
    pub combined: Vec<MatchSummary>,
}

/// How a potential assignment was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialSource {
    /// From a combined (proximity-linked) match.
    Linked,
    /// From an assignment whose context overlaps a same-page date's context.
    Overlapping,
}

#[derive(Debug, Clone, Serialize)]
pub struct PotentialAssignment {
    pub source: PotentialSource,
    pub page: usize,
    pub context: String,
    /// Combined match text (`"<assignment> | <date>"`), for linked entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    /// Assignment keyword text, for overlapping entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nearby_dates: Vec<String>,
    /// Absent for linked entries whose assignment is not in the assignment list.
    #[serde(flatten)]
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructuredReport {
    pub raw_matches: ExtractionResult,
    pub by_page: BTreeMap<usize, PageMatches>,
    pub potential_assignments: Vec<PotentialAssignment>,
}

/// Build the report. `classify` must be the same scorer used elsewhere in
/// the request so every view agrees on each assignment's classification.
pub fn build_report(
    raw: ExtractionResult,
    classify: impl Fn(&Match) -> Classification,
) -> StructuredReport {
    let by_page = group_by_page(&raw, &classify);

    let mut potential_assignments = Vec::new();

    for combined in &raw.combined {
        let assignment_text = assignment_part(&combined.text);
        let classification = raw
            .assignments
            .iter()
            .find(|a| a.text == assignment_text && a.page_number == combined.page_number)
            .map(&classify);
        potential_assignments.push(PotentialAssignment {
            source: PotentialSource::Linked,
            page: combined.page_number,
            context: combined.context.clone(),
            full_text: Some(combined.text.clone()),
            assignment_text: None,
            nearby_dates: Vec::new(),
            classification,
        });
    }

    // Deliberately overlaps the linked entries above; both views are kept.
    for assignment in &raw.assignments {
        let nearby_dates: Vec<String> = raw
            .dates
            .iter()
            .filter(|d| d.page_number == assignment.page_number && contexts_overlap(d, assignment))
            .map(|d| d.text.clone())
            .collect();
        if nearby_dates.is_empty() {
            continue;
        }
        potential_assignments.push(PotentialAssignment {
            source: PotentialSource::Overlapping,
            page: assignment.page_number,
            context: assignment.context.clone(),
            full_text: None,
            assignment_text: Some(assignment.text.clone()),
            nearby_dates,
            classification: Some(classify(assignment)),
        });
    }

    StructuredReport {
        raw_matches: raw,
        by_page,
        potential_assignments,
    }
}

fn contexts_overlap(a: &Match, b: &Match) -> bool {
    a.context.contains(b.context.as_str()) || b.context.contains(a.context.as_str())
}

fn group_by_page(
    raw: &ExtractionResult,
    classify: &impl Fn(&Match) -> Classification,
) -> BTreeMap<usize, PageMatches> {
    let mut by_page: BTreeMap<usize, PageMatches> = BTreeMap::new();
    for m in &raw.assignments {
        by_page
            .entry(m.page_number)
            .or_default()
            .assignments
            .push(ScoredMatch {
                text: m.text.clone(),
                context: m.context.clone(),
                position: m.position,
                classification: classify(m),
            });
    }
    for m in &raw.dates {
        by_page.entry(m.page_number).or_default().dates.push(m.into());
    }
    for m in &raw.combined {
        by_page
            .entry(m.page_number)
            .or_default()
            .combined
            .push(m.into());
    }
    by_page
}
