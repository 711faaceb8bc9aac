//! Persisted settings for backends, API keys, and routing defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no cloud API key is configured.
const ENV_CLOUD_API_KEY: &str = "KESTREL_CLOUD_API_KEY";

/// Complete persisted configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Local daemon backend settings.
    pub daemon: DaemonSettings,
    /// Local model-file store settings.
    pub file_store: FileStoreSettings,
    /// Cloud backend settings.
    pub cloud: CloudSettings,
}

/// Local inference daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonSettings {
    /// Whether the daemon backend is enabled.
    pub enabled: bool,
    /// Base URL of the daemon HTTP API.
    pub url: String,
}

impl Default for DaemonSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: "http://localhost:11434".to_owned(),
        }
    }
}

/// Local model-file store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStoreSettings {
    /// Whether the file-store backend is enabled.
    pub enabled: bool,
    /// Directory scanned for model weight files.
    pub model_dir: PathBuf,
}

impl Default for FileStoreSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Cloud backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudSettings {
    /// Whether the cloud backend is enabled.
    pub enabled: bool,
    /// API key for the cloud provider, if configured here.
    pub api_key: Option<String>,
    /// Curated cloud model table.
    pub models: Vec<CloudModelEntry>,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            models: CloudModelEntry::curated_defaults(),
        }
    }
}

/// One curated cloud model with its trust rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudModelEntry {
    /// Provider-native model identifier.
    pub name: String,
    /// Curated trust score, 0-10.
    pub trust_score: f32,
    /// Context window in tokens.
    pub context_window: u32,
    /// Declared parameter count, when published.
    pub parameter_count: Option<String>,
}

impl CloudModelEntry {
    /// The default curated cloud model table.
    pub fn curated_defaults() -> Vec<Self> {
        vec![
            Self {
                name: "anthropic/claude-3-5-sonnet".to_owned(),
                trust_score: 9.0,
                context_window: 200_000,
                parameter_count: None,
            },
            Self {
                name: "anthropic/claude-3-5-haiku".to_owned(),
                trust_score: 8.0,
                context_window: 200_000,
                parameter_count: None,
            },
            Self {
                name: "deepseek/deepseek-chat".to_owned(),
                trust_score: 7.0,
                context_window: 64_000,
                parameter_count: None,
            },
        ]
    }
}

impl Settings {
    /// Get the default config directory path (`~/.kestrel`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_owned()))?;
        Ok(home.join(".kestrel"))
    }

    /// Get the default config file path (`~/.kestrel/config.toml`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load settings from the default location (`~/.kestrel/config.toml`).
    /// If the file doesn't exist, creates it with default values.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or created
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            let settings = Self::default();
            settings.save_to_file(&config_path)?;
            Ok(settings)
        }
    }

    /// Load settings from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|error| Error::Config(format!("Failed to read settings: {error}")))?;
        let settings: Self = toml::from_str(&contents)
            .map_err(|error| Error::Config(format!("Failed to parse settings: {error}")))?;

        tracing::debug!(
            "Loaded settings from {:?}: cloud api_key={}",
            path,
            if settings.cloud.api_key.is_some() {
                "present"
            } else {
                "missing"
            }
        );

        Ok(settings)
    }

    /// Save settings to a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                Error::Config(format!("Failed to create settings directory: {error}"))
            })?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|error| Error::Config(format!("Failed to serialize settings: {error}")))?;

        let header = "# Kestrel Configuration File\n\
                      # This file is automatically generated on first run\n\
                      # Edit this file to customize your settings\n\n";

        fs::write(path, format!("{header}{contents}"))
            .map_err(|error| Error::Config(format!("Failed to write settings: {error}")))?;

        Ok(())
    }

    /// Get the cloud API key, checking the settings file first, then the
    /// `KESTREL_CLOUD_API_KEY` environment variable.
    pub fn cloud_api_key(&self) -> Option<String> {
        self.cloud
            .api_key
            .clone()
            .or_else(|| env::var(ENV_CLOUD_API_KEY).ok())
    }
}
