//! The top-level configuration document and its persistence.
//!
//! Covers:
//! - `load` / `save` (YAML file I/O with atomic write)
//! - XDG-compliant path helpers (`config_path`, `config_dir`)
//! - Per-module section lookup used by the module manager

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::module_config::{ModuleConfig, ModuleSection};
use crate::types::{BackendSetting, LogLevel};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Verbosity of the debug log file
    #[serde(default)]
    pub log_level: LogLevel,

    /// Display backend reported to modules
    #[serde(default)]
    pub backend: BackendSetting,

    /// Module sections keyed by module name
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleSection>,
}

impl Default for Config {
    fn default() -> Self {
        let mut modules = BTreeMap::new();
        for name in [
            "sync-update",
            "visual-bell",
            "box-drawing",
            "notify",
            "font-zoom",
            "clipboard",
        ] {
            modules.insert(name.to_string(), ModuleSection::default());
        }
        modules.insert(
            "background".to_string(),
            ModuleSection {
                enabled: false,
                ..ModuleSection::default()
            }
            .with_setting("color", "#1e1e2e"),
        );
        modules.insert(
            "fallback-font".to_string(),
            ModuleSection {
                enabled: false,
                ..ModuleSection::default()
            }
            .with_setting("families", vec!["Noto Color Emoji", "Symbola"]),
        );
        Self {
            log_level: LogLevel::default(),
            backend: BackendSetting::default(),
            modules,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        log::info!("Config path: {:?}", config_path);

        if config_path.exists() {
            log::info!("Loading existing config from {:?}", config_path);
            Ok(Self::load_from(&config_path)?)
        } else {
            log::info!(
                "Config file not found, creating default at {:?}",
                config_path
            );
            let config = Self::default();
            if let Err(e) = config.save() {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            log::info!("Default config created successfully");
            Ok(config)
        }
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())?;
        Ok(())
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Get the configuration file path (using XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("plugterm")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("plugterm")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Check semantic constraints that YAML parsing alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in self.modules.keys() {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "module section with empty name".to_string(),
                ));
            }
            if name.chars().any(char::is_whitespace) {
                return Err(ConfigError::Validation(format!(
                    "module name '{name}' must not contain whitespace"
                )));
            }
        }
        Ok(())
    }

    /// Section for `name`, if the config has one.
    pub fn module_section(&self, name: &str) -> Option<&ModuleSection> {
        self.modules.get(name)
    }

    /// Snapshot of the section for `name`.
    ///
    /// Modules without a section get an empty, disabled snapshot.
    pub fn module_config(&self, name: &str) -> ModuleConfig {
        match self.modules.get(name) {
            Some(section) => ModuleConfig::from_section(name, section),
            None => ModuleConfig::new(name),
        }
    }

    /// Insert or replace a module section.
    pub fn set_module(&mut self, name: impl Into<String>, section: ModuleSection) {
        self.modules.insert(name.into(), section);
    }

    /// Names of all modules the config enables.
    pub fn enabled_modules(&self) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|(_, section)| section.enabled)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
