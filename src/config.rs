use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::export::ExportFormat;

/// Environment variable pointing at a settings file.
pub const CONFIG_ENV: &str = "DATA_SWEEPER_CONFIG";
/// Settings file looked up in the working directory when the variable is unset.
pub const CONFIG_FILE: &str = "data_sweeper.json";

/// User-tunable settings. Missing keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows shown in each file's preview table.
    pub preview_rows: usize,
    /// Conversion target pre-selected for newly uploaded files.
    pub default_export: ExportFormat,
    /// Initial window size in logical pixels.
    pub window_size: [f32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            default_export: ExportFormat::Csv,
            window_size: [1200.0, 800.0],
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Settings from `$DATA_SWEEPER_CONFIG` or `./data_sweeper.json`, else
    /// defaults. A broken file is logged and ignored.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::locate() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings: {e:#}");
                Self::default()
            }
        }
    }

    fn locate() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(CONFIG_FILE);
        local.is_file().then_some(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "preview_rows": 10 }"#).unwrap();
        assert_eq!(s.preview_rows, 10);
        assert_eq!(s.default_export, ExportFormat::Csv);
        assert_eq!(s.window_size, [1200.0, 800.0]);
    }

    #[test]
    fn export_target_accepts_excel_alias() {
        let s: Settings = serde_json::from_str(r#"{ "default_export": "excel" }"#).unwrap();
        assert_eq!(s.default_export, ExportFormat::Spreadsheet);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Settings::load(Path::new("/nonexistent/data_sweeper.json")).unwrap_err();
        assert!(format!("{err:#}").contains("reading settings file"));
    }
}
