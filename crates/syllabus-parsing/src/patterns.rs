//! Compiled patterns for dates, assignment keywords, and scoring signals.
//!
//! A [`PatternLibrary`] is built once per extractor and never mutated while
//! scanning, so a single instance can be shared freely between requests
//! (including across threads). There is no global pattern state.

use regex::{Regex, RegexBuilder};

use crate::config::ParsingConfig;
use crate::scoring::ScoringWeights;

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";
const MONTHS_ABBR: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec";
const WEEKDAYS: &str = "Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday";

/// The six supported date layouts, in alternation order.
pub fn default_date_patterns() -> Vec<String> {
    vec![
        // MM/DD/YYYY or MM-DD-YYYY
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b".to_string(),
        // Month DD, YYYY
        format!(r"\b(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b"),
        // Mon DD, YYYY
        format!(r"\b(?:{MONTHS_ABBR})\.?\s+\d{{1,2}},?\s+\d{{4}}\b"),
        // DD Month YYYY
        format!(r"\b\d{{1,2}}\s+(?:{MONTHS})\s+\d{{4}}\b"),
        // YYYY-MM-DD
        r"\b\d{4}-\d{2}-\d{2}\b".to_string(),
        // Weekday, Month DD, YYYY
        format!(r"\b(?:{WEEKDAYS}),?\s+(?:{MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b"),
    ]
}

/// Whole-word assignment keywords. `due date` precedes `due` so the longer
/// phrase wins at the same position.
pub const DEFAULT_ASSIGNMENT_KEYWORDS: &[&str] = &[
    r"\bassignment\b",
    r"\bassignments\b",
    r"\bdue\s+date\b",
    r"\bdue\b",
    r"\bhomework\b",
    r"\bproject\b",
    r"\bexam\b",
    r"\bfinal\b",
    r"\bmidterm\b",
    r"\bquiz\b",
    r"\blab\b",
];

/// Keywords whose own match earns the specific-keyword bonus.
pub const SPECIFIC_KEYWORDS: &[&str] = &["homework", "project", "exam", "quiz", "lab"];

/// Join patterns into one case-insensitive alternation, one group per pattern.
pub fn compile_alternation<S: AsRef<str>>(patterns: &[S]) -> Result<Regex, regex::Error> {
    let joined = patterns
        .iter()
        .map(|p| format!("({})", p.as_ref()))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&joined).case_insensitive(true).build()
}

fn builtin(pattern: &str, case_insensitive: bool) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .expect("built-in pattern compiles")
}

/// Which version of the context a signal looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    /// The lower-cased context.
    Lowered,
    /// The context exactly as extracted.
    Original,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

/// How a signal decides whether (and how much) it fires.
#[derive(Debug, Clone)]
pub enum Detector {
    /// Fires once if the pattern matches anywhere in the context.
    Present(Regex),
    /// Fires once per occurrence; the total contribution is capped at `cap`.
    Counted { regex: Regex, cap: f64 },
    /// A supplied same-page date appears verbatim in the context. With no
    /// dates supplied, the library's date pattern is tried instead.
    DateInContext,
    /// The matched keyword itself is one of these (compared lower-cased).
    Keyword(&'static [&'static str]),
}

/// One row of the scoring table.
#[derive(Debug, Clone)]
pub struct SignalRule {
    pub name: &'static str,
    pub weight: f64,
    pub case: CaseMode,
    pub detector: Detector,
}

impl SignalRule {
    pub fn polarity(&self) -> Polarity {
        if self.weight < 0.0 {
            Polarity::Negative
        } else {
            Polarity::Positive
        }
    }
}

/// The default scoring table with the given weights.
pub fn default_signals(weights: &ScoringWeights) -> Vec<SignalRule> {
    vec![
        SignalRule {
            name: "assignment_number",
            weight: weights.assignment_number,
            case: CaseMode::Lowered,
            detector: Detector::Present(builtin(
                r"\b(?:assignment|homework|hw|project|exam|quiz|lab)\s*[#:]?\s*\d+\b",
                true,
            )),
        },
        SignalRule {
            name: "due_date_proximity",
            weight: weights.due_date_proximity,
            case: CaseMode::Lowered,
            detector: Detector::DateInContext,
        },
        SignalRule {
            name: "action_verbs",
            weight: weights.action_verbs,
            case: CaseMode::Lowered,
            detector: Detector::Counted {
                regex: builtin(
                    r"\b(?:submit|complete|turn\s+in|hand\s+in|due|hand\s+out|assign)\b",
                    true,
                ),
                cap: weights.action_verbs_cap,
            },
        },
        SignalRule {
            name: "point_values",
            weight: weights.point_values,
            case: CaseMode::Lowered,
            detector: Detector::Present(builtin(
                r"\b(?:points?|pts?|worth|percent|%|grade)\b",
                true,
            )),
        },
        SignalRule {
            name: "capitalized_title",
            weight: weights.capitalized_title,
            case: CaseMode::Original,
            detector: Detector::Present(builtin(
                r"\b(?:Assignment|Homework|Project|Exam|Quiz|Lab)\s+[A-Z][A-Za-z\s]+",
                false,
            )),
        },
        SignalRule {
            name: "list_format",
            weight: weights.list_format,
            case: CaseMode::Original,
            detector: Detector::Present(builtin(r"(?m)^\s*[•\-*\d+.]", false)),
        },
        SignalRule {
            name: "specific_keywords",
            weight: weights.specific_keywords,
            case: CaseMode::Lowered,
            detector: Detector::Keyword(SPECIFIC_KEYWORDS),
        },
        SignalRule {
            name: "assignment_of",
            weight: weights.assignment_of,
            case: CaseMode::Lowered,
            detector: Detector::Present(builtin(
                r"\bassignment\s+of\s+(?:grades?|readings?|scores?|points?)\b",
                true,
            )),
        },
        SignalRule {
            name: "reading_assignment",
            weight: weights.reading_assignment,
            case: CaseMode::Lowered,
            detector: Detector::Present(builtin(r"\breading\s+assignment\b", true)),
        },
        SignalRule {
            name: "general_description",
            weight: weights.general_description,
            case: CaseMode::Lowered,
            detector: Detector::Present(builtin(
                r"\bassignment\s+(?:schedule|calendar|list|overview|summary)\b",
                true,
            )),
        },
    ]
}

/// Immutable set of compiled patterns used by the finder and the scorer.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    date: Regex,
    assignment: Regex,
    signals: Vec<SignalRule>,
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new(&ParsingConfig::default())
    }
}

impl PatternLibrary {
    pub fn new(config: &ParsingConfig) -> Self {
        let date =
            compile_alternation(&default_date_patterns()).expect("built-in pattern compiles");
        let assignment = config.assignment_re.clone().unwrap_or_else(|| {
            compile_alternation(DEFAULT_ASSIGNMENT_KEYWORDS).expect("built-in pattern compiles")
        });
        Self {
            date,
            assignment,
            signals: default_signals(&config.scoring_weights()),
        }
    }

    pub fn date_pattern(&self) -> &Regex {
        &self.date
    }

    pub fn assignment_pattern(&self) -> &Regex {
        &self.assignment
    }

    pub fn signals(&self) -> &[SignalRule] {
        &self.signals
    }

    /// Append a scoring signal.
    pub fn with_signal(mut self, rule: SignalRule) -> Self {
        self.signals.push(rule);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found<'a>(re: &Regex, text: &'a str) -> Vec<&'a str> {
        re.find_iter(text).map(|m| m.as_str()).collect()
    }

    #[test]
    fn test_date_formats() {
        let lib = PatternLibrary::default();
        let re = lib.date_pattern();
        assert_eq!(found(re, "due 10/15/2026"), vec!["10/15/2026"]);
        assert_eq!(found(re, "due 10-15-26"), vec!["10-15-26"]);
        assert_eq!(found(re, "October 15, 2026"), vec!["October 15, 2026"]);
        assert_eq!(found(re, "Oct. 15 2026"), vec!["Oct. 15 2026"]);
        assert_eq!(found(re, "15 October 2026"), vec!["15 October 2026"]);
        assert_eq!(found(re, "on 2026-10-15."), vec!["2026-10-15"]);
        assert_eq!(
            found(re, "Thursday, October 15, 2026"),
            vec!["Thursday, October 15, 2026"]
        );
    }

    #[test]
    fn test_date_case_insensitive() {
        let lib = PatternLibrary::default();
        assert!(lib.date_pattern().is_match("OCTOBER 15, 2026"));
        assert!(lib.date_pattern().is_match("october 15, 2026"));
    }

    #[test]
    fn test_date_no_semantic_validation() {
        let lib = PatternLibrary::default();
        assert_eq!(found(lib.date_pattern(), "13/45/2026"), vec!["13/45/2026"]);
    }

    #[test]
    fn test_assignment_keywords_whole_word() {
        let lib = PatternLibrary::default();
        let re = lib.assignment_pattern();
        assert_eq!(
            found(re, "Assignments and the Due Date for the FINAL"),
            vec!["Assignments", "Due Date", "FINAL"]
        );
        assert!(found(re, "labels finalize projector examine").is_empty());
    }

    #[test]
    fn test_due_date_preferred_over_due() {
        let lib = PatternLibrary::default();
        assert_eq!(found(lib.assignment_pattern(), "due date"), vec!["due date"]);
        assert_eq!(found(lib.assignment_pattern(), "due friday"), vec!["due"]);
    }

    #[test]
    fn test_default_table_shape() {
        let lib = PatternLibrary::default();
        let signals = lib.signals();
        assert_eq!(signals.len(), 10);
        let negatives: Vec<_> = signals
            .iter()
            .filter(|s| s.polarity() == Polarity::Negative)
            .map(|s| s.name)
            .collect();
        assert_eq!(
            negatives,
            vec!["assignment_of", "reading_assignment", "general_description"]
        );
        let original_case: Vec<_> = signals
            .iter()
            .filter(|s| s.case == CaseMode::Original)
            .map(|s| s.name)
            .collect();
        assert_eq!(original_case, vec!["capitalized_title", "list_format"]);
    }

    #[test]
    fn test_capitalized_title_is_case_sensitive() {
        let lib = PatternLibrary::default();
        let rule = lib
            .signals()
            .iter()
            .find(|s| s.name == "capitalized_title")
            .unwrap();
        let Detector::Present(re) = &rule.detector else {
            panic!("capitalized_title should be a presence signal");
        };
        assert!(re.is_match("Project Proposal due"));
        assert!(!re.is_match("project proposal due"));
        assert!(!re.is_match("Assignment 3"));
    }

    #[test]
    fn test_list_format_matches_bullets() {
        let lib = PatternLibrary::default();
        let rule = lib
            .signals()
            .iter()
            .find(|s| s.name == "list_format")
            .unwrap();
        let Detector::Present(re) = &rule.detector else {
            panic!("list_format should be a presence signal");
        };
        assert!(re.is_match("Intro\n  • Homework 1"));
        assert!(re.is_match("Intro\n- Homework 1"));
        assert!(re.is_match("3. Quiz"));
        assert!(!re.is_match("Homework 1 is due"));
    }

    #[test]
    fn test_with_signal_appends_row() {
        let lib = PatternLibrary::default().with_signal(SignalRule {
            name: "rubric",
            weight: 0.05,
            case: CaseMode::Lowered,
            detector: Detector::Present(Regex::new(r"\brubric\b").unwrap()),
        });
        assert_eq!(lib.signals().len(), 11);
        assert_eq!(lib.signals()[10].name, "rubric");
    }

    #[test]
    fn test_compile_alternation_rejects_invalid() {
        assert!(compile_alternation(&["ok", "[bad"]).is_err());
    }
}
