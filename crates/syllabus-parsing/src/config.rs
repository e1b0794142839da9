use regex::Regex;
use syllabus_core::config_file::ParsingSection;

use crate::patterns::{DEFAULT_ASSIGNMENT_KEYWORDS, compile_alternation};
use crate::scoring::ScoringWeights;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the assignment extraction pipeline.
///
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    /// Characters of context kept on each side of a match (default: 200).
    pub(crate) context_window: usize,
    /// Confidence at or above which an assignment counts as real (default: 0.5).
    pub(crate) assignment_threshold: f64,
    /// Assignment and date must start fewer than this many characters apart
    /// to be linked (default: 300).
    pub(crate) link_distance: usize,
    /// Compiled keyword alternation. `None` means the built-in keywords.
    pub(crate) assignment_re: Option<Regex>,
    pub(crate) scoring_weights: Option<ScoringWeights>,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            context_window: 200,
            assignment_threshold: 0.5,
            link_distance: 300,
            assignment_re: None,
            scoring_weights: None,
        }
    }
}

impl ParsingConfig {
    /// Get the scoring weights, using defaults if not configured.
    pub(crate) fn scoring_weights(&self) -> ScoringWeights {
        self.scoring_weights.clone().unwrap_or_default()
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    pub fn assignment_threshold(&self) -> f64 {
        self.assignment_threshold
    }

    pub fn link_distance(&self) -> usize {
        self.link_distance
    }
}

/// Builder for [`ParsingConfig`].
///
/// Keyword patterns are compiled in [`build()`](Self::build), which fails
/// fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    context_window: Option<usize>,
    assignment_threshold: Option<f64>,
    link_distance: Option<usize>,
    assignment_keywords: ListOverride<String>,
    scoring_weights: Option<ScoringWeights>,
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the `[parsing]` table of an on-disk config.
    pub fn from_section(section: &ParsingSection) -> Self {
        let mut builder = Self {
            context_window: section.context_window,
            assignment_threshold: section.assignment_threshold,
            link_distance: section.link_distance,
            ..Self::default()
        };
        for keyword in section.extra_keywords.iter().flatten() {
            builder = builder.add_assignment_keyword(keyword.clone());
        }
        builder
    }

    // ── Scalars ──

    pub fn context_window(mut self, chars: usize) -> Self {
        self.context_window = Some(chars);
        self
    }

    pub fn assignment_threshold(mut self, threshold: f64) -> Self {
        self.assignment_threshold = Some(threshold);
        self
    }

    pub fn link_distance(mut self, chars: usize) -> Self {
        self.link_distance = Some(chars);
        self
    }

    // ── Assignment keywords ──

    pub fn set_assignment_keywords(mut self, patterns: Vec<String>) -> Self {
        self.assignment_keywords = ListOverride::Replace(patterns);
        self
    }

    pub fn add_assignment_keyword(mut self, pattern: String) -> Self {
        match &mut self.assignment_keywords {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(pattern),
            ListOverride::Default => {
                self.assignment_keywords = ListOverride::Extend(vec![pattern])
            }
        }
        self
    }

    // ── Scoring weights ──

    pub fn scoring_weights(mut self, weights: ScoringWeights) -> Self {
        self.scoring_weights = Some(weights);
        self
    }

    /// Compile keyword patterns and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let defaults = ParsingConfig::default();

        let assignment_re = match &self.assignment_keywords {
            ListOverride::Default => None,
            keywords => {
                let defaults: Vec<String> = DEFAULT_ASSIGNMENT_KEYWORDS
                    .iter()
                    .map(|k| k.to_string())
                    .collect();
                let patterns = keywords.resolve(&defaults);
                // Report the offending pattern rather than the joined alternation.
                for p in &patterns {
                    Regex::new(p)?;
                }
                Some(compile_alternation(&patterns)?)
            }
        };

        Ok(ParsingConfig {
            context_window: self.context_window.unwrap_or(defaults.context_window),
            assignment_threshold: self
                .assignment_threshold
                .unwrap_or(defaults.assignment_threshold),
            link_distance: self.link_distance.unwrap_or(defaults.link_distance),
            assignment_re,
            scoring_weights: self.scoring_weights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert_eq!(config.context_window, 200);
        assert_eq!(config.link_distance, 300);
        assert!((config.assignment_threshold - 0.5).abs() < f64::EPSILON);
        assert!(config.assignment_re.is_none());
    }

    #[test]
    fn test_builder_basic() {
        let config = ParsingConfigBuilder::new()
            .context_window(50)
            .assignment_threshold(0.6)
            .link_distance(120)
            .build()
            .unwrap();
        assert_eq!(config.context_window(), 50);
        assert_eq!(config.link_distance(), 120);
        assert!((config.assignment_threshold() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_builder_extra_keyword() {
        let config = ParsingConfigBuilder::new()
            .add_assignment_keyword(r"\bessay\b".to_string())
            .build()
            .unwrap();
        let re = config.assignment_re.unwrap();
        assert!(re.is_match("Essay 2"));
        assert!(re.is_match("homework"));
    }

    #[test]
    fn test_builder_replace_keywords() {
        let config = ParsingConfigBuilder::new()
            .set_assignment_keywords(vec![r"\bpaper\b".to_string()])
            .build()
            .unwrap();
        let re = config.assignment_re.unwrap();
        assert!(re.is_match("Paper due"));
        assert!(!re.is_match("homework"));
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ParsingConfigBuilder::new()
            .add_assignment_keyword("[invalid".to_string())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_from_section() {
        let section = ParsingSection {
            context_window: Some(80),
            assignment_threshold: None,
            link_distance: Some(100),
            extra_keywords: Some(vec![r"\bessay\b".to_string()]),
        };
        let config = ParsingConfigBuilder::from_section(&section).build().unwrap();
        assert_eq!(config.context_window(), 80);
        assert_eq!(config.link_distance(), 100);
        assert!((config.assignment_threshold() - 0.5).abs() < f64::EPSILON);
        assert!(config.assignment_re.unwrap().is_match("essay"));
    }

    #[test]
    fn test_list_override_resolve() {
        let defaults = vec!["a".to_string(), "b".to_string()];

        let d: ListOverride<String> = ListOverride::Default;
        assert_eq!(d.resolve(&defaults), defaults);

        let r: ListOverride<String> = ListOverride::Replace(vec!["x".to_string()]);
        assert_eq!(r.resolve(&defaults), vec!["x".to_string()]);

        let e: ListOverride<String> = ListOverride::Extend(vec!["c".to_string()]);
        assert_eq!(
            e.resolve(&defaults),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }
}
