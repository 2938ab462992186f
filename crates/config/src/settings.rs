// Converter settings
// Loaded from ~/.config/datalines/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Output
    /// Library of the default output data set (`WORK.LIB_MEMBER`)
    #[serde(rename = "output.library")]
    pub output_library: String,

    /// Save programs as UTF-8 (true) or ASCII (false)
    #[serde(rename = "output.preserveEncoding")]
    pub preserve_encoding: bool,

    // Source
    /// Library assumed when a table is named without `LIB.`
    #[serde(rename = "source.defaultLibrary")]
    pub default_library: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_library: "WORK".to_string(),
            preserve_encoding: true,
            default_library: "main".to_string(),
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // Library for the default output data set name
    "output.library": "WORK",

    // true = UTF-8, false = ASCII (non-ASCII characters become '?')
    "output.preserveEncoding": true,

    // Library used when a table is given without a LIB. prefix
    "source.defaultLibrary": "main"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("datalines")
            .join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing or malformed file yields the
    /// defaults; `//` comment lines are allowed.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, String> {
        // Strip comments (lines starting with //)
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Write the commented default file if none exists yet
    pub fn init_at(path: &Path) -> Result<bool, String> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(path, DEFAULT_FILE).map_err(|e| e.to_string())?;
        Ok(true)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        fs::write(path, self.to_pretty_json()?).map_err(|e| e.to_string())
    }

    pub fn to_pretty_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| e.to_string())
    }
}
