// Run settings
// Looked up in order: explicit path, <folder>/keyset.toml,
// ~/.config/keyset/settings.toml, built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use keyset_engine::{KeyFilter, ReconcileMode};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const FOLDER_SETTINGS_FILE: &str = "keyset.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Tabular file inside the scanned folder; read first, rewritten on export.
    pub tabular_file: String,

    /// Prefix of the timestamped JSON export.
    pub json_prefix: String,

    /// chrono format string for the JSON export timestamp.
    pub timestamp_format: String,

    /// Extension of markup key files (matched case-insensitively, no dot).
    pub markup_extension: String,

    pub reconcile: ReconcileMode,

    /// Keys containing any of these substrings are discarded.
    pub rejected_key_fragments: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tabular_file: "keys.csv".into(),
            json_prefix: "keys_".into(),
            timestamp_format: "%Y-%d-%m_%H-%M-%S".into(),
            markup_extension: "xml".into(),
            reconcile: ReconcileMode::FixedPoint,
            rejected_key_fragments: KeyFilter::default().rejected_fragments,
        }
    }
}

/// Where the effective settings came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    Explicit(PathBuf),
    Folder(PathBuf),
    User(PathBuf),
    Defaults,
}

impl std::fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(p) | Self::Folder(p) | Self::User(p) => write!(f, "{}", p.display()),
            Self::Defaults => write!(f, "built-in defaults"),
        }
    }
}

impl Settings {
    /// User-level settings file.
    pub fn user_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyset")
            .join("settings.toml")
    }

    pub fn from_toml(input: &str, path: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(input).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents, path)
    }

    /// Resolve settings for a run over `folder`. A missing optional file is
    /// skipped; a present but broken one is an error.
    pub fn resolve(explicit: Option<&Path>, folder: &Path) -> Result<(Self, SettingsSource), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, SettingsSource::Explicit(path.to_path_buf())));
        }

        let folder_path = folder.join(FOLDER_SETTINGS_FILE);
        if folder_path.is_file() {
            return Ok((Self::from_file(&folder_path)?, SettingsSource::Folder(folder_path)));
        }

        let user_path = Self::user_config_path();
        if user_path.is_file() {
            return Ok((Self::from_file(&user_path)?, SettingsSource::User(user_path)));
        }

        Ok((Self::default(), SettingsSource::Defaults))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tabular_file.trim().is_empty() {
            return Err(ConfigError::Validation("tabular_file must not be empty".into()));
        }
        // These three end up in file names inside the scanned folder.
        for (field, value) in [
            ("tabular_file", &self.tabular_file),
            ("json_prefix", &self.json_prefix),
            ("timestamp_format", &self.timestamp_format),
        ] {
            if value.contains(['/', '\\']) {
                return Err(ConfigError::Validation(format!(
                    "{field} must not contain path separators, got '{value}'"
                )));
            }
        }
        if self.timestamp_format.trim().is_empty() {
            return Err(ConfigError::Validation("timestamp_format must not be empty".into()));
        }
        if self.markup_extension.trim().is_empty() {
            return Err(ConfigError::Validation("markup_extension must not be empty".into()));
        }
        if self.rejected_key_fragments.iter().any(|f| f.is_empty()) {
            return Err(ConfigError::Validation(
                "rejected_key_fragments must not contain empty strings".into(),
            ));
        }
        Ok(())
    }

    pub fn key_filter(&self) -> KeyFilter {
        KeyFilter::new(self.rejected_key_fragments.clone())
    }

    /// Extension without a leading dot, lowercased.
    pub fn markup_extension(&self) -> String {
        self.markup_extension.trim().trim_start_matches('.').to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
