//! Resolve parsing settings from flags, environment, and config files.
//!
//! Precedence: CLI flags > environment > config file > built-in defaults.

use anyhow::Context;
use syllabus_core::config_file::ConfigFile;
use syllabus_parsing::{ParsingConfig, ParsingConfigBuilder};

pub const THRESHOLD_VAR: &str = "SYLLABUS_THRESHOLD";
pub const CONTEXT_WINDOW_VAR: &str = "SYLLABUS_CONTEXT_WINDOW";

/// Values that can override the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub threshold: Option<f64>,
    pub context_window: Option<usize>,
}

impl Overrides {
    /// Layer `self` over `base`.
    pub fn or(self, base: Overrides) -> Overrides {
        Overrides {
            threshold: self.threshold.or(base.threshold),
            context_window: self.context_window.or(base.context_window),
        }
    }
}

/// Read overrides from the environment through `lookup`.
///
/// Unparseable values are reported and ignored.
pub fn env_overrides(lookup: impl Fn(&str) -> Option<String>) -> Overrides {
    Overrides {
        threshold: parse_var(&lookup, THRESHOLD_VAR),
        context_window: parse_var(&lookup, CONTEXT_WINDOW_VAR),
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "ignoring unparseable environment variable");
            None
        }
    }
}

fn check_threshold(threshold: f64) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "threshold must be between 0 and 1, got {}",
        threshold
    );
    Ok(())
}

/// Write flag values into the `[parsing]` table of `file`.
pub fn apply(overrides: Overrides, mut file: ConfigFile) -> anyhow::Result<ConfigFile> {
    let parsing = file.parsing.get_or_insert_with(Default::default);
    if let Some(threshold) = overrides.threshold {
        check_threshold(threshold)?;
        parsing.assignment_threshold = Some(threshold);
    }
    if let Some(chars) = overrides.context_window {
        parsing.context_window = Some(chars);
    }
    Ok(file)
}

/// Build the parsing config. `fallback_threshold` applies only when nothing
/// else sets a threshold.
pub fn resolve(
    overrides: Overrides,
    file: &ConfigFile,
    fallback_threshold: Option<f64>,
) -> anyhow::Result<ParsingConfig> {
    let section = file.parsing.clone().unwrap_or_default();
    let mut builder = ParsingConfigBuilder::from_section(&section);

    if let Some(threshold) = overrides
        .threshold
        .or(section.assignment_threshold)
        .or(fallback_threshold)
    {
        check_threshold(threshold)?;
        builder = builder.assignment_threshold(threshold);
    }
    if let Some(chars) = overrides.context_window {
        builder = builder.context_window(chars);
    }

    builder
        .build()
        .context("invalid extra_keywords pattern in config file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use syllabus_core::config_file::{self, ParsingSection};

    fn file(threshold: Option<f64>, context_window: Option<usize>) -> ConfigFile {
        ConfigFile {
            parsing: Some(ParsingSection {
                assignment_threshold: threshold,
                context_window,
                ..Default::default()
            }),
            display: None,
        }
    }

    #[test]
    fn test_env_overrides_parse() {
        let vars: HashMap<&str, &str> =
            [(THRESHOLD_VAR, "0.7"), (CONTEXT_WINDOW_VAR, "abc")].into();
        let o = env_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(o.threshold, Some(0.7));
        assert_eq!(o.context_window, None);
    }

    #[test]
    fn test_flags_beat_env_beat_file() {
        let flags = Overrides {
            threshold: Some(0.9),
            context_window: None,
        };
        let env = Overrides {
            threshold: Some(0.7),
            context_window: Some(50),
        };
        let config = resolve(flags.or(env), &file(Some(0.4), Some(80)), None).unwrap();
        assert_eq!(config.assignment_threshold(), 0.9);
        assert_eq!(config.context_window(), 50);
    }

    #[test]
    fn test_file_beats_fallback() {
        let config = resolve(Overrides::default(), &file(Some(0.4), None), Some(0.6)).unwrap();
        assert_eq!(config.assignment_threshold(), 0.4);
        assert_eq!(config.context_window(), 200);
    }

    #[test]
    fn test_fallback_and_defaults() {
        let config = resolve(Overrides::default(), &ConfigFile::default(), Some(0.6)).unwrap();
        assert_eq!(config.assignment_threshold(), 0.6);
        let config = resolve(Overrides::default(), &ConfigFile::default(), None).unwrap();
        assert_eq!(config.assignment_threshold(), 0.5);
        assert_eq!(config.link_distance(), 300);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let flags = Overrides {
            threshold: Some(1.5),
            context_window: None,
        };
        assert!(resolve(flags, &ConfigFile::default(), None).is_err());
    }

    #[test]
    fn test_apply_keeps_other_settings() {
        let mut base = file(Some(0.4), Some(80));
        base.parsing.as_mut().unwrap().link_distance = Some(150);
        let flags = Overrides {
            threshold: Some(0.7),
            context_window: None,
        };
        let updated = apply(flags, base).unwrap();
        let parsing = updated.parsing.unwrap();
        assert_eq!(parsing.assignment_threshold, Some(0.7));
        assert_eq!(parsing.context_window, Some(80));
        assert_eq!(parsing.link_distance, Some(150));
    }

    #[test]
    fn test_apply_then_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syllabus-scan").join("config.toml");
        let flags = Overrides {
            threshold: None,
            context_window: Some(120),
        };
        let updated = apply(flags, ConfigFile::default()).unwrap();
        config_file::save_to_path(&updated, &path).unwrap();

        let loaded = config_file::load_from_path(&path).unwrap();
        assert_eq!(loaded.parsing.unwrap().context_window, Some(120));
    }

    #[test]
    fn test_apply_rejects_bad_threshold() {
        let flags = Overrides {
            threshold: Some(-0.1),
            context_window: None,
        };
        assert!(apply(flags, ConfigFile::default()).is_err());
    }

    #[test]
    fn test_bad_extra_keyword_rejected() {
        let config = ConfigFile {
            parsing: Some(ParsingSection {
                extra_keywords: Some(vec![r"\bessay(".to_string()]),
                ..Default::default()
            }),
            display: None,
        };
        let err = resolve(Overrides::default(), &config, None).unwrap_err();
        assert!(err.to_string().contains("extra_keywords"), "{err}");
    }
}
