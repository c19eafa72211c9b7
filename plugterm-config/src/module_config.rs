//! Per-module configuration sections.
//!
//! The config file has one mapping per module under `modules:`:
//!
//! ```yaml
//! modules:
//!   visual-bell:
//!     enabled: true
//!     priority: -100
//!     duration_ms: 120
//!     color: "#ffffff40"
//! ```
//!
//! `enabled` and `priority` are structural keys read by the module manager.
//! Every other key is module-private and is passed through unparsed as a
//! [`ModuleConfig`] snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};

use crate::error::ConfigError;

/// One module's section of the config document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleSection {
    /// Whether the module should be activated (default: true when the section exists)
    #[serde(default = "crate::defaults::bool_true")]
    pub enabled: bool,

    /// Dispatch priority override (lower runs earlier). `None` keeps the
    /// module's built-in default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,

    /// Module-private settings (all remaining keys)
    #[serde(flatten)]
    pub settings: Mapping,
}

impl Default for ModuleSection {
    fn default() -> Self {
        Self {
            enabled: true,
            priority: None,
            settings: Mapping::new(),
        }
    }
}

impl ModuleSection {
    /// Builder-style helper to add a module-private setting.
    pub fn with_setting(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.settings.insert(Value::String(key.to_string()), value.into());
        self
    }
}

/// Opaque, module-scoped view of configuration handed to a module's
/// `configure` callback.
///
/// The snapshot is a copy: later edits to the [`Config`](crate::Config) do not
/// leak into a module until the host configures it again.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleConfig {
    name: String,
    enabled: bool,
    priority: Option<i32>,
    settings: Mapping,
}

impl ModuleConfig {
    /// An empty, disabled snapshot for a module with no config section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            priority: None,
            settings: Mapping::new(),
        }
    }

    /// Snapshot a module's section.
    pub fn from_section(name: impl Into<String>, section: &ModuleSection) -> Self {
        Self {
            name: name.into(),
            enabled: section.enabled,
            priority: section.priority,
            settings: section.settings.clone(),
        }
    }

    /// Builder-style helper to add a setting (used by hosts and tests).
    pub fn with_setting(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.settings.insert(Value::String(key.to_string()), value.into());
        self
    }

    /// Name of the module this snapshot belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the section asked for the module to be enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Configured priority override, if any.
    pub fn priority(&self) -> Option<i32> {
        self.priority
    }

    /// `true` if the section carries no module-private settings.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// `true` if a module-private setting named `key` exists.
    pub fn contains(&self, key: &str) -> bool {
        self.settings.contains_key(key)
    }

    /// Raw access to the module-private settings.
    pub fn settings(&self) -> &Mapping {
        &self.settings
    }

    /// Read and deserialize one setting.
    ///
    /// Returns `Ok(None)` when the key is absent and an error when it is
    /// present but has the wrong shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.settings.get(key) {
            Some(value) => serde_yaml_ng::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::Validation(format!("{}.{}: {}", self.name, key, e))),
            None => Ok(None),
        }
    }

    /// Read one setting, falling back to `default` when it is absent or invalid.
    ///
    /// Invalid values are logged so that a typo in the config file does not
    /// silently disable a feature.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                log::warn!("{e}; using default");
                default
            }
        }
    }

    /// Deserialize all module-private settings into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Ok(serde_yaml_ng::from_value(Value::Mapping(
            self.settings.clone(),
        ))?)
    }
}
