//! Confidence scoring for assignment mentions.
//!
//! Every signal in the [`PatternLibrary`] table is evaluated independently
//! against the match's context and the contributions are summed. The raw sum
//! is mapped linearly from [`RAW_SCORE_MIN`, `RAW_SCORE_MAX`] onto `[0, 1]`
//! and clamped, so overlapping signals can never push confidence out of range.

use syllabus_core::{Classification, Match};

use crate::patterns::{CaseMode, Detector, PatternLibrary, SignalRule};

/// Raw score that maps to confidence 0.0.
pub const RAW_SCORE_MIN: f64 = -1.6;
/// Raw score that maps to confidence 1.0.
pub const RAW_SCORE_MAX: f64 = 1.5;

/// Per-signal weights. Negative weights penalize false-positive phrasing.
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    pub assignment_number: f64,
    pub due_date_proximity: f64,
    /// Per action-verb occurrence.
    pub action_verbs: f64,
    /// Upper bound on the summed action-verb contribution.
    pub action_verbs_cap: f64,
    pub point_values: f64,
    pub capitalized_title: f64,
    pub list_format: f64,
    pub specific_keywords: f64,
    pub assignment_of: f64,
    pub reading_assignment: f64,
    pub general_description: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            assignment_number: 0.3,
            due_date_proximity: 0.4,
            action_verbs: 0.2,
            action_verbs_cap: 0.4,
            point_values: 0.2,
            capitalized_title: 0.2,
            list_format: 0.1,
            specific_keywords: 0.1,
            assignment_of: -0.8,
            reading_assignment: -0.5,
            general_description: -0.3,
        }
    }
}

/// Map a raw score onto `[0, 1]`.
pub fn normalize(raw: f64) -> f64 {
    ((raw - RAW_SCORE_MIN) / (RAW_SCORE_MAX - RAW_SCORE_MIN)).clamp(0.0, 1.0)
}

/// What a single signal gets to look at.
struct SignalInput<'a> {
    original: &'a str,
    lowered: &'a str,
    keyword: &'a str,
    /// Lower-cased texts of same-page dates; `None` when no dates were supplied.
    dates: Option<Vec<String>>,
    library: &'a PatternLibrary,
}

impl SignalInput<'_> {
    fn context(&self, case: CaseMode) -> &str {
        match case {
            CaseMode::Lowered => self.lowered,
            CaseMode::Original => self.original,
        }
    }
}

fn contribution(rule: &SignalRule, input: &SignalInput<'_>) -> f64 {
    let context = input.context(rule.case);
    match &rule.detector {
        Detector::Present(re) => {
            if re.is_match(context) {
                rule.weight
            } else {
                0.0
            }
        }
        Detector::Counted { regex, cap } => {
            let hits = regex.find_iter(context).count() as f64;
            (hits * rule.weight).min(*cap)
        }
        Detector::DateInContext => {
            let fired = match &input.dates {
                Some(dates) => dates.iter().any(|d| context.contains(d.as_str())),
                None => input.library.date_pattern().is_match(context),
            };
            if fired { rule.weight } else { 0.0 }
        }
        Detector::Keyword(keywords) => {
            if keywords.contains(&input.keyword) {
                rule.weight
            } else {
                0.0
            }
        }
    }
}

/// The single entry point for classifying assignment matches.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer<'a> {
    library: &'a PatternLibrary,
}

impl<'a> ConfidenceScorer<'a> {
    pub fn new(library: &'a PatternLibrary) -> Self {
        Self { library }
    }

    /// Sum of all signal contributions, before normalization.
    ///
    /// Only dates on the same page as `m` are considered. `None` and an empty
    /// slice both mean "no dates supplied".
    pub fn raw_score(&self, m: &Match, dates: Option<&[Match]>) -> f64 {
        let lowered = m.context.to_lowercase();
        let keyword = m.text.to_lowercase();
        let dates = dates.filter(|d| !d.is_empty()).map(|dates| {
            dates
                .iter()
                .filter(|d| d.page_number == m.page_number)
                .map(|d| d.text.to_lowercase())
                .collect()
        });
        let input = SignalInput {
            original: &m.context,
            lowered: &lowered,
            keyword: &keyword,
            dates,
            library: self.library,
        };

        self.library
            .signals()
            .iter()
            .map(|rule| contribution(rule, &input))
            .sum()
    }

    pub fn classify(&self, m: &Match, dates: Option<&[Match]>, threshold: f64) -> Classification {
        let raw = self.raw_score(m, dates);
        let confidence = normalize(raw);
        tracing::trace!(text = %m.text, page = m.page_number, raw, confidence, "classified");
        Classification {
            is_real: confidence >= threshold,
            confidence,
        }
    }
}
