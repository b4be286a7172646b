use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults::GlobalDefaults;
use crate::error::ConfigError;
use crate::paths::PathCase;

/// Application settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub version: String,
    /// Directory holding the persisted queue and watch-folder documents.
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub path_case: PathCase,
    /// Provider names used when naming API translation outputs.
    #[serde(default = "default_known_providers")]
    pub known_providers: Vec<String>,
    /// Model names besides the configured model paths whose outputs should
    /// not be re-queued.
    #[serde(default)]
    pub known_models: Vec<String>,
    /// JSON file with the translation history ledger.
    #[serde(default)]
    pub history_file: Option<String>,
    #[serde(default)]
    pub defaults: GlobalDefaults,
}

fn default_known_providers() -> Vec<String> {
    vec![
        "openai".to_string(),
        "deepseek".to_string(),
        "anthropic".to_string(),
        "gemini".to_string(),
        "openrouter".to_string(),
        "siliconflow".to_string(),
    ]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            data_dir: None,
            path_case: PathCase::host(),
            known_providers: default_known_providers(),
            known_models: Vec::new(),
            history_file: None,
            defaults: GlobalDefaults::default(),
        }
    }
}

impl Settings {
    /// Resolved storage directory, falling back to the platform data directory.
    pub fn storage_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return PathBuf::from(dir);
        }
        dirs::data_dir()
            .map(|p| p.join("transq"))
            .unwrap_or_else(|| std::env::temp_dir().join("transq"))
    }
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_settings_from_str(&content)
}

pub fn load_settings_from_str(content: &str) -> Result<Settings, ConfigError> {
    let settings: Settings = serde_json::from_str(content)?;
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported settings version: {}", settings.version),
        });
    }

    let defaults = &settings.defaults;
    if !(0.0..=2.0).contains(&defaults.temperature) {
        return Err(ConfigError::Validation {
            message: format!(
                "Temperature must be between 0 and 2, got {}",
                defaults.temperature
            ),
        });
    }
    if defaults.ctx_size == 0 {
        return Err(ConfigError::Validation {
            message: "Context size must be greater than zero".to_string(),
        });
    }
    if defaults.concurrency == 0 {
        return Err(ConfigError::Validation {
            message: "Concurrency must be greater than zero".to_string(),
        });
    }
    if defaults.rep_penalty_max < defaults.rep_penalty_base {
        return Err(ConfigError::Validation {
            message: format!(
                "Maximum repetition penalty {} is below the base penalty {}",
                defaults.rep_penalty_max, defaults.rep_penalty_base
            ),
        });
    }

    if let Some(empty_idx) = settings
        .known_providers
        .iter()
        .position(|p| p.trim().is_empty())
    {
        return Err(ConfigError::Validation {
            message: format!("Provider name at index {} is empty", empty_idx),
        });
    }

    Ok(())
}
