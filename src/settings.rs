use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DashError, Result};

/// Presentation preferences. Never holds dataset contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,
}

fn default_export_dir() -> String {
    dirs::download_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .to_string()
}

fn default_preview_rows() -> usize {
    10
}

fn default_chart_width() -> usize {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
            preview_rows: default_preview_rows(),
            chart_width: default_chart_width(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("sheetdash")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring malformed settings at {}: {e}", path.display());
            Settings::default()
        }),
        Err(_) => Settings::default(),
    }
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| DashError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

/// Expand a leading `~` to the home directory.
pub fn shellexpand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            export_dir: "/tmp/reports".to_string(),
            preview_rows: 5,
            chart_width: 40,
        };
        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings_from(&dir.path().join("nope.json"));
        assert_eq!(s.preview_rows, 10);
        assert_eq!(s.chart_width, 30);
        assert!(!s.export_dir.is_empty());
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"preview_rows": 3}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.preview_rows, 3);
        assert_eq!(s.chart_width, 30);
        assert_eq!(s.export_dir, default_export_dir());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings_to(&Settings::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_shellexpand_plain_path() {
        assert_eq!(shellexpand_path("/tmp/x"), PathBuf::from("/tmp/x"));
    }
}
