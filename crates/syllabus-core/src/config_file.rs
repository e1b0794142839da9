use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub parsing: Option<ParsingSection>,
    pub display: Option<DisplayConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingSection {
    pub context_window: Option<usize>,
    pub assignment_threshold: Option<f64>,
    pub link_distance: Option<usize>,
    /// Extra regex alternatives appended to the assignment keyword pattern.
    pub extra_keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub color: Option<bool>,
    /// `"json"` or `"text"`.
    pub format: Option<String>,
}

/// Platform config directory path: `<config_dir>/syllabus-scan/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("syllabus-scan").join("config.toml"))
}

/// Load config by cascading CWD `.syllabus-scan.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".syllabus-scan.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let bp = base.parsing.unwrap_or_default();
    let op = overlay.parsing.unwrap_or_default();
    let bd = base.display.unwrap_or_default();
    let od = overlay.display.unwrap_or_default();

    ConfigFile {
        parsing: Some(ParsingSection {
            context_window: op.context_window.or(bp.context_window),
            assignment_threshold: op.assignment_threshold.or(bp.assignment_threshold),
            link_distance: op.link_distance.or(bp.link_distance),
            extra_keywords: op.extra_keywords.or(bp.extra_keywords),
        }),
        display: Some(DisplayConfig {
            color: od.color.or(bd.color),
            format: od.format.or(bd.format),
        }),
    }
}

/// Save the config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, String> {
    let path = config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
    save_to_path(config, &path)?;
    Ok(path)
}

/// Save the config to `path`, creating parent directories as needed.
pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|e| format!("Failed to serialize config: {}", e))?;
    std::fs::write(path, content).map_err(|e| format!("Failed to write config: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_round_trip_toml() {
        let config = ConfigFile {
            parsing: Some(ParsingSection {
                assignment_threshold: Some(0.6),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.parsing.unwrap().assignment_threshold, Some(0.6));
    }

    #[test]
    fn absent_fields_deserialize_as_none() {
        let toml_str = "[parsing]\ncontext_window = 120\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let parsing = parsed.parsing.unwrap();
        assert_eq!(parsing.context_window, Some(120));
        assert!(parsing.link_distance.is_none());
        assert!(parsed.display.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            parsing: Some(ParsingSection {
                context_window: Some(100),
                link_distance: Some(250),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            parsing: Some(ParsingSection {
                context_window: Some(300),
                ..Default::default()
            }),
            display: Some(DisplayConfig {
                color: Some(false),
                ..Default::default()
            }),
        };
        let merged = merge(base, overlay);
        let parsing = merged.parsing.unwrap();
        assert_eq!(parsing.context_window, Some(300));
        assert_eq!(parsing.link_distance, Some(250));
        assert_eq!(merged.display.unwrap().color, Some(false));
    }

    #[test]
    fn save_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ConfigFile {
            parsing: Some(ParsingSection {
                extra_keywords: Some(vec![r"\bessay\b".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        save_to_path(&config, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(
            loaded.parsing.unwrap().extra_keywords.unwrap(),
            vec![r"\bessay\b".to_string()]
        );
    }

    #[test]
    fn load_from_path_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "parsing = [not toml").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());
    }
}
