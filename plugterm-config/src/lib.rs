//! Configuration system for plugterm terminal emulator.
//!
//! This crate provides configuration loading, saving, and default values
//! for the terminal emulator. It includes:
//!
//! - The top-level [`Config`] document (YAML, XDG path layout)
//! - Per-module sections ([`ModuleSection`]) and the opaque, module-scoped
//!   snapshot handed to modules at configure time ([`ModuleConfig`])
//! - Typed error variants ([`ConfigError`])

pub mod config;
pub mod defaults;
pub mod error;
pub mod module_config;
mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::ConfigError;
pub use module_config::{ModuleConfig, ModuleSection};
pub use types::{BackendSetting, LogLevel};
